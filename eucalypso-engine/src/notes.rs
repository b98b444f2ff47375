//! Held-note bookkeeping across hold and latch play modes.
//!
//! Four parallel ordered sets: the physically held keys (pitch-ascending and
//! as-played) and the active set the lanes actually read. In hold mode the
//! active set mirrors the physical one; in latch mode it survives release
//! until the next note-on after a full release replaces it.

use eucalypso_types::PlayMode;

use crate::rng;

/// Most keys tracked at once; later presses are ignored beyond this.
pub const MAX_HELD_NOTES: usize = 16;

#[derive(Debug, Clone, Default)]
pub struct NoteTracker {
    physical: Vec<u8>,
    physical_as_played: Vec<u8>,
    active: Vec<u8>,
    active_as_played: Vec<u8>,
    latch_armed: bool,
}

fn add_sorted(set: &mut Vec<u8>, note: u8) {
    if set.len() >= MAX_HELD_NOTES || set.contains(&note) {
        return;
    }
    let pos = set.partition_point(|&n| n < note);
    set.insert(pos, note);
}

fn add_tail(set: &mut Vec<u8>, note: u8) {
    if set.len() >= MAX_HELD_NOTES || set.contains(&note) {
        return;
    }
    set.push(note);
}

fn remove(set: &mut Vec<u8>, note: u8) {
    if let Some(pos) = set.iter().position(|&n| n == note) {
        set.remove(pos);
    }
}

impl NoteTracker {
    pub fn new(play_mode: PlayMode) -> Self {
        Self {
            latch_armed: play_mode == PlayMode::Latch,
            ..Self::default()
        }
    }

    /// Pitch-ascending active set.
    pub fn active(&self) -> &[u8] {
        &self.active
    }

    /// Active set in the order the keys were first pressed.
    pub fn active_as_played(&self) -> &[u8] {
        &self.active_as_played
    }

    pub fn physical(&self) -> &[u8] {
        &self.physical
    }

    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Hash of the active set, order-sensitive; reseeds the rand held order.
    pub fn active_hash(&self) -> u32 {
        rng::fnv1a(&self.active)
    }

    /// Register a key press. Returns true when a latched set was replaced by
    /// this press (the caller may re-anchor the phrase on that).
    pub fn note_on(&mut self, note: u8, play_mode: PlayMode) -> bool {
        let replacing = play_mode == PlayMode::Latch && self.latch_armed;
        add_sorted(&mut self.physical, note);
        add_tail(&mut self.physical_as_played, note);
        match play_mode {
            PlayMode::Latch => {
                if self.latch_armed {
                    self.active.clear();
                    self.active_as_played.clear();
                    self.latch_armed = false;
                }
                add_sorted(&mut self.active, note);
                add_tail(&mut self.active_as_played, note);
            }
            PlayMode::Hold => self.sync_active_to_physical(),
        }
        replacing && !self.active.is_empty()
    }

    /// Register a key release. In latch mode the active set is untouched;
    /// releasing the last key arms replacement for the next press.
    pub fn note_off(&mut self, note: u8, play_mode: PlayMode) {
        remove(&mut self.physical, note);
        remove(&mut self.physical_as_played, note);
        match play_mode {
            PlayMode::Latch => {
                if self.physical.is_empty() {
                    self.latch_armed = true;
                }
            }
            PlayMode::Hold => self.sync_active_to_physical(),
        }
    }

    /// Apply a play-mode change; the active set re-syncs to the keys that are
    /// physically down right now.
    pub fn set_play_mode(&mut self, play_mode: PlayMode) {
        match play_mode {
            PlayMode::Hold => {
                self.latch_armed = false;
                self.sync_active_to_physical();
            }
            PlayMode::Latch => {
                if self.physical.is_empty() {
                    self.latch_armed = true;
                } else {
                    self.sync_active_to_physical();
                    self.latch_armed = false;
                }
            }
        }
    }

    /// Transport-stop reset.
    pub fn clear(&mut self, play_mode: PlayMode) {
        self.physical.clear();
        self.physical_as_played.clear();
        self.active.clear();
        self.active_as_played.clear();
        self.latch_armed = play_mode == PlayMode::Latch;
    }

    fn sync_active_to_physical(&mut self) {
        self.active.clear();
        self.active_as_played.clear();
        self.active.extend_from_slice(&self.physical);
        for &note in &self.physical_as_played {
            if self.active.contains(&note) {
                self.active_as_played.push(note);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_active_mirrors_physical() {
        let mut tracker = NoteTracker::new(PlayMode::Hold);
        tracker.note_on(64, PlayMode::Hold);
        tracker.note_on(60, PlayMode::Hold);
        assert_eq!(tracker.active(), &[60, 64]);
        assert_eq!(tracker.active_as_played(), &[64, 60]);

        tracker.note_off(64, PlayMode::Hold);
        assert_eq!(tracker.active(), &[60]);
        assert_eq!(tracker.active_as_played(), &[60]);

        tracker.note_off(60, PlayMode::Hold);
        assert!(!tracker.has_active());
    }

    #[test]
    fn latch_survives_full_release() {
        let mut tracker = NoteTracker::new(PlayMode::Latch);
        tracker.note_on(60, PlayMode::Latch);
        tracker.note_on(64, PlayMode::Latch);
        tracker.note_off(60, PlayMode::Latch);
        tracker.note_off(64, PlayMode::Latch);
        assert_eq!(tracker.active(), &[60, 64]);
        assert!(tracker.physical().is_empty());
    }

    #[test]
    fn latch_next_press_replaces_set() {
        let mut tracker = NoteTracker::new(PlayMode::Latch);
        tracker.note_on(60, PlayMode::Latch);
        tracker.note_off(60, PlayMode::Latch);

        let replaced = tracker.note_on(67, PlayMode::Latch);
        assert!(replaced);
        assert_eq!(tracker.active(), &[67]);

        // Further presses extend the new set without replacing again.
        let replaced = tracker.note_on(71, PlayMode::Latch);
        assert!(!replaced);
        assert_eq!(tracker.active(), &[67, 71]);
    }

    #[test]
    fn latch_partial_release_does_not_arm() {
        let mut tracker = NoteTracker::new(PlayMode::Latch);
        tracker.note_on(60, PlayMode::Latch);
        tracker.note_on(64, PlayMode::Latch);
        tracker.note_off(60, PlayMode::Latch);

        let replaced = tracker.note_on(62, PlayMode::Latch);
        assert!(!replaced);
        assert_eq!(tracker.active(), &[60, 62, 64]);
    }

    #[test]
    fn mode_toggle_resyncs_to_physical() {
        let mut tracker = NoteTracker::new(PlayMode::Latch);
        tracker.note_on(60, PlayMode::Latch);
        tracker.note_off(60, PlayMode::Latch);
        assert_eq!(tracker.active(), &[60]);

        tracker.set_play_mode(PlayMode::Hold);
        assert!(!tracker.has_active());
    }

    #[test]
    fn toggle_to_latch_with_keys_down_keeps_them() {
        let mut tracker = NoteTracker::new(PlayMode::Hold);
        tracker.note_on(60, PlayMode::Hold);
        tracker.set_play_mode(PlayMode::Latch);
        assert_eq!(tracker.active(), &[60]);

        tracker.note_off(60, PlayMode::Latch);
        assert_eq!(tracker.active(), &[60]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut tracker = NoteTracker::new(PlayMode::Latch);
        tracker.note_on(60, PlayMode::Latch);
        tracker.clear(PlayMode::Latch);
        assert!(!tracker.has_active());
        assert!(tracker.physical().is_empty());

        // Post-clear, the next press starts a fresh latched set.
        let replaced = tracker.note_on(72, PlayMode::Latch);
        assert!(replaced);
        assert_eq!(tracker.active(), &[72]);
    }

    #[test]
    fn held_capacity_is_sixteen() {
        let mut tracker = NoteTracker::new(PlayMode::Hold);
        for note in 0..MAX_HELD_NOTES as u8 + 4 {
            tracker.note_on(note, PlayMode::Hold);
        }
        assert_eq!(tracker.active().len(), MAX_HELD_NOTES);
    }

    #[test]
    fn duplicate_note_on_is_idempotent() {
        let mut tracker = NoteTracker::new(PlayMode::Hold);
        tracker.note_on(60, PlayMode::Hold);
        tracker.note_on(60, PlayMode::Hold);
        assert_eq!(tracker.active(), &[60]);
        assert_eq!(tracker.active_as_played(), &[60]);
    }

    #[test]
    fn active_hash_tracks_set_changes() {
        let mut tracker = NoteTracker::new(PlayMode::Hold);
        tracker.note_on(60, PlayMode::Hold);
        let h1 = tracker.active_hash();
        tracker.note_on(64, PlayMode::Hold);
        let h2 = tracker.active_hash();
        assert_ne!(h1, h2);
        tracker.note_off(64, PlayMode::Hold);
        assert_eq!(tracker.active_hash(), h1);
    }
}
