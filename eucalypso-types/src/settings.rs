use serde::{Deserialize, Serialize};

use crate::music::ScaleMode;
use crate::{MAX_REGISTER_NOTES, MAX_VOICES};

/// How incoming keys map onto the active note set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayMode {
    /// Active set mirrors the physically held keys.
    Hold,
    /// Active set persists after release until replaced by the next note-on.
    Latch,
}

impl PlayMode {
    pub const ALL: [PlayMode; 2] = [PlayMode::Hold, PlayMode::Latch];

    pub fn name(&self) -> &'static str {
        match self {
            PlayMode::Hold => "hold",
            PlayMode::Latch => "latch",
        }
    }

    pub fn parse(name: &str) -> Option<PlayMode> {
        PlayMode::ALL.iter().copied().find(|m| m.name() == name)
    }
}

/// Whether lane phase restarts when a fresh phrase begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetriggerMode {
    Restart,
    Cont,
}

impl RetriggerMode {
    pub const ALL: [RetriggerMode; 2] = [RetriggerMode::Restart, RetriggerMode::Cont];

    pub fn name(&self) -> &'static str {
        match self {
            RetriggerMode::Restart => "restart",
            RetriggerMode::Cont => "cont",
        }
    }

    pub fn parse(name: &str) -> Option<RetriggerMode> {
        RetriggerMode::ALL.iter().copied().find(|m| m.name() == name)
    }
}

/// Step timing source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// Sample-accurate internal timer driven by bpm and block frame counts.
    Internal,
    /// External 24-ppqn MIDI clock bytes.
    Clock,
}

impl SyncMode {
    pub const ALL: [SyncMode; 2] = [SyncMode::Internal, SyncMode::Clock];

    pub fn name(&self) -> &'static str {
        match self {
            SyncMode::Internal => "internal",
            SyncMode::Clock => "clock",
        }
    }

    pub fn parse(name: &str) -> Option<SyncMode> {
        SyncMode::ALL.iter().copied().find(|m| m.name() == name)
    }
}

/// Step rate as a beat division, triplets included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rate {
    ThirtySecond,
    SixteenthTriplet,
    Sixteenth,
    EighthTriplet,
    Eighth,
    QuarterTriplet,
    Quarter,
    Half,
    Whole,
}

impl Rate {
    pub const ALL: [Rate; 9] = [
        Rate::ThirtySecond,
        Rate::SixteenthTriplet,
        Rate::Sixteenth,
        Rate::EighthTriplet,
        Rate::Eighth,
        Rate::QuarterTriplet,
        Rate::Quarter,
        Rate::Half,
        Rate::Whole,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rate::ThirtySecond => "1/32",
            Rate::SixteenthTriplet => "1/16T",
            Rate::Sixteenth => "1/16",
            Rate::EighthTriplet => "1/8T",
            Rate::Eighth => "1/8",
            Rate::QuarterTriplet => "1/4T",
            Rate::Quarter => "1/4",
            Rate::Half => "1/2",
            Rate::Whole => "1",
        }
    }

    pub fn parse(name: &str) -> Option<Rate> {
        Rate::ALL.iter().copied().find(|r| r.name() == name)
    }

    /// Steps per quarter note.
    pub fn notes_per_beat(&self) -> f64 {
        match self {
            Rate::ThirtySecond => 8.0,
            Rate::SixteenthTriplet => 6.0,
            Rate::Sixteenth => 4.0,
            Rate::EighthTriplet => 3.0,
            Rate::Eighth => 2.0,
            Rate::QuarterTriplet => 1.5,
            Rate::Quarter => 1.0,
            Rate::Half => 0.5,
            Rate::Whole => 0.25,
        }
    }

    /// Triplet rates keep a straight grid; swing does not apply to them.
    pub fn is_triplet(&self) -> bool {
        matches!(
            self,
            Rate::SixteenthTriplet | Rate::EighthTriplet | Rate::QuarterTriplet
        )
    }
}

/// Where the note register draws its pool from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterMode {
    Held,
    Scale,
}

impl RegisterMode {
    pub const ALL: [RegisterMode; 2] = [RegisterMode::Held, RegisterMode::Scale];

    pub fn name(&self) -> &'static str {
        match self {
            RegisterMode::Held => "held",
            RegisterMode::Scale => "scale",
        }
    }

    pub fn parse(name: &str) -> Option<RegisterMode> {
        RegisterMode::ALL.iter().copied().find(|m| m.name() == name)
    }
}

/// Ordering of the held-note pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeldOrder {
    Up,
    Down,
    Played,
    Rand,
}

impl HeldOrder {
    pub const ALL: [HeldOrder; 4] = [
        HeldOrder::Up,
        HeldOrder::Down,
        HeldOrder::Played,
        HeldOrder::Rand,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HeldOrder::Up => "up",
            HeldOrder::Down => "down",
            HeldOrder::Played => "played",
            HeldOrder::Rand => "rand",
        }
    }

    pub fn parse(name: &str) -> Option<HeldOrder> {
        HeldOrder::ALL.iter().copied().find(|o| o.name() == name)
    }
}

/// What a lane does when its register index points past the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingNotePolicy {
    Skip,
    Fold,
    Wrap,
    Random,
}

impl MissingNotePolicy {
    pub const ALL: [MissingNotePolicy; 4] = [
        MissingNotePolicy::Skip,
        MissingNotePolicy::Fold,
        MissingNotePolicy::Wrap,
        MissingNotePolicy::Random,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MissingNotePolicy::Skip => "skip",
            MissingNotePolicy::Fold => "fold",
            MissingNotePolicy::Wrap => "wrap",
            MissingNotePolicy::Random => "random",
        }
    }

    pub fn parse(name: &str) -> Option<MissingNotePolicy> {
        MissingNotePolicy::ALL.iter().copied().find(|p| p.name() == name)
    }
}

/// Global engine configuration shared by every lane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub play_mode: PlayMode,
    pub retrigger_mode: RetriggerMode,
    pub rate: Rate,
    pub sync: SyncMode,
    pub bpm: u16,       // 40-240
    pub swing: u8,      // 0-100
    pub max_voices: u8, // 1-64
    pub velocity: u8,   // 1-127, lane default
    pub velocity_rnd: u8,
    pub gate: u16, // 1-1600 percent of a step, lane default
    pub gate_rnd: u16,
    pub rnd_seed: u16,
    pub rand_cycle: u8, // 1-128, randomization period in steps
    pub register_mode: RegisterMode,
    pub held_order: HeldOrder,
    pub held_order_seed: u16,
    pub scale_mode: ScaleMode,
    pub scale_range: u8, // 1-24 pool notes in scale mode
    pub root_note: u8,   // 0-11
    pub octave: i8,      // -3..=3, global transpose
    pub missing_note_policy: MissingNotePolicy,
    pub missing_note_seed: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            play_mode: PlayMode::Hold,
            retrigger_mode: RetriggerMode::Cont,
            rate: Rate::Sixteenth,
            sync: SyncMode::Internal,
            bpm: 120,
            swing: 0,
            max_voices: 8,
            velocity: 100,
            velocity_rnd: 0,
            gate: 100,
            gate_rnd: 0,
            rnd_seed: 0,
            rand_cycle: 16,
            register_mode: RegisterMode::Held,
            held_order: HeldOrder::Up,
            held_order_seed: 0,
            scale_mode: ScaleMode::Major,
            scale_range: 8,
            root_note: 0,
            octave: 0,
            missing_note_policy: MissingNotePolicy::Skip,
            missing_note_seed: 0,
        }
    }
}

impl EngineConfig {
    /// Clamp every numeric field into its documented range.
    pub fn normalize(&mut self) {
        self.bpm = self.bpm.clamp(40, 240);
        self.swing = self.swing.min(100);
        self.max_voices = self.max_voices.clamp(1, MAX_VOICES as u8);
        self.velocity = self.velocity.clamp(1, 127);
        self.velocity_rnd = self.velocity_rnd.min(127);
        self.gate = self.gate.clamp(1, 1600);
        self.gate_rnd = self.gate_rnd.min(1600);
        self.rand_cycle = self.rand_cycle.clamp(1, 128);
        self.scale_range = self.scale_range.clamp(1, MAX_REGISTER_NOTES as u8);
        self.root_note = self.root_note.min(11);
        self.octave = self.octave.clamp(-3, 3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_all_has_9() {
        assert_eq!(Rate::ALL.len(), 9);
    }

    #[test]
    fn rate_notes_per_beat() {
        assert!((Rate::Sixteenth.notes_per_beat() - 4.0).abs() < f64::EPSILON);
        assert!((Rate::QuarterTriplet.notes_per_beat() - 1.5).abs() < f64::EPSILON);
        assert!((Rate::Whole.notes_per_beat() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn rate_triplets_flagged() {
        let triplets: Vec<Rate> = Rate::ALL.iter().copied().filter(Rate::is_triplet).collect();
        assert_eq!(
            triplets,
            vec![Rate::SixteenthTriplet, Rate::EighthTriplet, Rate::QuarterTriplet]
        );
    }

    #[test]
    fn rate_parse_round_trips() {
        for rate in Rate::ALL {
            assert_eq!(Rate::parse(rate.name()), Some(rate));
        }
        assert_eq!(Rate::parse("1/64"), None);
    }

    #[test]
    fn mode_enums_parse_round_trip() {
        for m in PlayMode::ALL {
            assert_eq!(PlayMode::parse(m.name()), Some(m));
        }
        for m in RetriggerMode::ALL {
            assert_eq!(RetriggerMode::parse(m.name()), Some(m));
        }
        for m in SyncMode::ALL {
            assert_eq!(SyncMode::parse(m.name()), Some(m));
        }
        for m in RegisterMode::ALL {
            assert_eq!(RegisterMode::parse(m.name()), Some(m));
        }
        for m in HeldOrder::ALL {
            assert_eq!(HeldOrder::parse(m.name()), Some(m));
        }
        for m in MissingNotePolicy::ALL {
            assert_eq!(MissingNotePolicy::parse(m.name()), Some(m));
        }
    }

    #[test]
    fn config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.bpm, 120);
        assert_eq!(config.rate, Rate::Sixteenth);
        assert_eq!(config.sync, SyncMode::Internal);
        assert_eq!(config.max_voices, 8);
        assert_eq!(config.rand_cycle, 16);
        assert_eq!(config.register_mode, RegisterMode::Held);
    }

    #[test]
    fn config_normalize_clamps() {
        let mut config = EngineConfig {
            bpm: 1000,
            swing: 255,
            max_voices: 0,
            velocity: 0,
            gate: 0,
            rand_cycle: 0,
            scale_range: 200,
            root_note: 99,
            octave: -9,
            ..EngineConfig::default()
        };
        config.normalize();
        assert_eq!(config.bpm, 240);
        assert_eq!(config.swing, 100);
        assert_eq!(config.max_voices, 1);
        assert_eq!(config.velocity, 1);
        assert_eq!(config.gate, 1);
        assert_eq!(config.rand_cycle, 1);
        assert_eq!(config.scale_range, 24);
        assert_eq!(config.root_note, 11);
        assert_eq!(config.octave, -3);
    }
}
