//! Register pool construction.
//!
//! The register is the ordered pitch pool lanes index into: either the active
//! held notes reordered by the configured held order, or a ladder walked up a
//! scale from a fixed base.

use eucalypso_types::{EngineConfig, HeldOrder, RegisterMode, MAX_REGISTER_NOTES};

use crate::notes::NoteTracker;
use crate::rng;

/// MIDI note the scale ladder starts from before the root offset (middle C).
pub const SCALE_BASE_NOTE: u8 = 60;

/// Build the current note pool. Empty in held mode when nothing is active.
pub fn build_register(config: &EngineConfig, tracker: &NoteTracker) -> Vec<u8> {
    match config.register_mode {
        RegisterMode::Held => build_held(config, tracker),
        RegisterMode::Scale => build_scale(config),
    }
}

fn build_held(config: &EngineConfig, tracker: &NoteTracker) -> Vec<u8> {
    let active = tracker.active();
    if active.is_empty() {
        return Vec::new();
    }

    let mut pool: Vec<u8> = match config.held_order {
        HeldOrder::Played => tracker.active_as_played().to_vec(),
        HeldOrder::Down => active.iter().rev().copied().collect(),
        HeldOrder::Up | HeldOrder::Rand => active.to_vec(),
    };
    if config.held_order == HeldOrder::Rand {
        // Reshuffles deterministically whenever the active set changes,
        // stable while it stays the same.
        let seed = u32::from(config.held_order_seed) ^ tracker.active_hash();
        rng::shuffle(&mut pool, seed);
    }
    pool.truncate(MAX_REGISTER_NOTES);
    pool
}

fn build_scale(config: &EngineConfig) -> Vec<u8> {
    let intervals = config.scale_mode.intervals();
    let count = usize::from(config.scale_range.clamp(1, MAX_REGISTER_NOTES as u8));
    let base = i16::from(SCALE_BASE_NOTE) + i16::from(config.root_note.min(11));
    (0..count)
        .map(|i| {
            let degree = i % intervals.len();
            let octave = (i / intervals.len()) as i16;
            (base + i16::from(intervals[degree]) + octave * 12).clamp(0, 127) as u8
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eucalypso_types::{PlayMode, ScaleMode};

    fn held_tracker(notes: &[u8]) -> NoteTracker {
        let mut tracker = NoteTracker::new(PlayMode::Hold);
        for &note in notes {
            tracker.note_on(note, PlayMode::Hold);
        }
        tracker
    }

    #[test]
    fn held_up_is_ascending() {
        let config = EngineConfig::default();
        let tracker = held_tracker(&[67, 60, 64]);
        assert_eq!(build_register(&config, &tracker), vec![60, 64, 67]);
    }

    #[test]
    fn held_down_is_descending() {
        let config = EngineConfig {
            held_order: HeldOrder::Down,
            ..EngineConfig::default()
        };
        let tracker = held_tracker(&[67, 60, 64]);
        assert_eq!(build_register(&config, &tracker), vec![67, 64, 60]);
    }

    #[test]
    fn held_played_keeps_press_order() {
        let config = EngineConfig {
            held_order: HeldOrder::Played,
            ..EngineConfig::default()
        };
        let tracker = held_tracker(&[67, 60, 64]);
        assert_eq!(build_register(&config, &tracker), vec![67, 60, 64]);
    }

    #[test]
    fn held_rand_is_stable_for_a_fixed_set() {
        let config = EngineConfig {
            held_order: HeldOrder::Rand,
            held_order_seed: 7,
            ..EngineConfig::default()
        };
        let tracker = held_tracker(&[60, 62, 64, 65, 67]);
        let first = build_register(&config, &tracker);
        let second = build_register(&config, &tracker);
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![60, 62, 64, 65, 67]);
    }

    #[test]
    fn held_rand_order_depends_only_on_the_current_set() {
        let config = EngineConfig {
            held_order: HeldOrder::Rand,
            held_order_seed: 7,
            ..EngineConfig::default()
        };
        let mut tracker = held_tracker(&[60, 62, 64, 65, 67]);
        let before = build_register(&config, &tracker);
        tracker.note_on(69, PlayMode::Hold);
        let grown = build_register(&config, &tracker);
        assert_ne!(grown, before);
        tracker.note_off(69, PlayMode::Hold);
        // Back to the original set: the original order returns.
        assert_eq!(build_register(&config, &tracker), before);
    }

    #[test]
    fn held_empty_active_gives_empty_pool() {
        let config = EngineConfig::default();
        let tracker = NoteTracker::new(PlayMode::Hold);
        assert!(build_register(&config, &tracker).is_empty());
    }

    #[test]
    fn scale_major_ladder_from_c() {
        let config = EngineConfig {
            register_mode: RegisterMode::Scale,
            scale_mode: ScaleMode::Major,
            scale_range: 8,
            root_note: 0,
            ..EngineConfig::default()
        };
        let tracker = NoteTracker::new(PlayMode::Hold);
        assert_eq!(
            build_register(&config, &tracker),
            vec![60, 62, 64, 65, 67, 69, 71, 72]
        );
    }

    #[test]
    fn scale_root_offsets_ladder() {
        let config = EngineConfig {
            register_mode: RegisterMode::Scale,
            scale_mode: ScaleMode::PentatonicMinor,
            scale_range: 6,
            root_note: 2,
            ..EngineConfig::default()
        };
        let tracker = NoteTracker::new(PlayMode::Hold);
        // D pentatonic minor: 62 65 67 69 72, then the octave repeat.
        assert_eq!(
            build_register(&config, &tracker),
            vec![62, 65, 67, 69, 72, 74]
        );
    }

    #[test]
    fn scale_pool_never_exceeds_cap_and_clamps_pitch() {
        let config = EngineConfig {
            register_mode: RegisterMode::Scale,
            scale_mode: ScaleMode::WholeTone,
            scale_range: 255,
            root_note: 11,
            ..EngineConfig::default()
        };
        let tracker = NoteTracker::new(PlayMode::Hold);
        let pool = build_register(&config, &tracker);
        assert_eq!(pool.len(), MAX_REGISTER_NOTES);
        assert!(pool.iter().all(|&n| n <= 127));
    }
}
