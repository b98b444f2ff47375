//! The `Eucalypso` instance: one MIDI-FX sequencing core.
//!
//! The host drives an instance through the [`MidiFx`] trait: one call per
//! inbound MIDI message, one call per audio block. Everything is synchronous;
//! all emitted messages for a call land in the caller's [`EventBuffer`].

use eucalypso_types::{EngineConfig, LaneConfig, RetriggerMode, SyncMode, MAX_LANES};

use crate::clock::TransportClock;
use crate::lanes::evaluate_lane;
use crate::midi::{EventBuffer, MidiMessage, RawMidi};
use crate::notes::NoteTracker;
use crate::params;
use crate::register::build_register;
use crate::voices::VoiceManager;

/// Host-side identity injected at construction.
#[derive(Debug, Clone)]
pub struct HostInfo {
    pub name: String,
    pub bank_name: String,
}

impl Default for HostInfo {
    fn default() -> Self {
        Self {
            name: "Eucalypso".to_string(),
            bank_name: "Factory".to_string(),
        }
    }
}

/// The call surface a hosting plugin shell drives.
pub trait MidiFx {
    /// Process one inbound raw MIDI message.
    fn process_midi(&mut self, msg: &[u8], out: &mut EventBuffer);
    /// Advance by one audio block.
    fn tick(&mut self, frames: u32, sample_rate: u32, out: &mut EventBuffer);
    /// Set a parameter by flat key; out-of-range values clamp, unknown keys
    /// and unparseable values are ignored.
    fn set_param(&mut self, key: &str, value: &str);
    /// Read a parameter's canonical value.
    fn get_param(&self, key: &str) -> Option<String>;
}

pub struct Eucalypso {
    pub(crate) host: HostInfo,
    pub(crate) config: EngineConfig,
    pub(crate) lanes: [LaneConfig; MAX_LANES],
    pub(crate) tracker: NoteTracker,
    pub(crate) clock: TransportClock,
    pub(crate) voices: VoiceManager,
    pub(crate) phrase_restart_pending: bool,
}

impl Eucalypso {
    pub fn new() -> Self {
        Self::with_host(HostInfo::default())
    }

    pub fn with_host(host: HostInfo) -> Self {
        let config = EngineConfig::default();
        let lanes = std::array::from_fn(|i| LaneConfig {
            enabled: i == 0,
            note: i as u8 + 1,
            ..LaneConfig::default()
        });
        let clock = TransportClock::new(config.sync, config.rate, config.bpm, config.swing);
        let tracker = NoteTracker::new(config.play_mode);
        Self {
            host,
            config,
            lanes,
            tracker,
            clock,
            voices: VoiceManager::new(),
            phrase_restart_pending: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn lane(&self, idx: usize) -> Option<&LaneConfig> {
        self.lanes.get(idx)
    }

    pub fn open_voices(&self) -> usize {
        self.voices.len()
    }

    /// Fire one anchor step: snap the phrase anchor if a restart is armed,
    /// then evaluate every lane in index order against the current register.
    fn run_anchor_step(&mut self, out: &mut EventBuffer) {
        if self.phrase_restart_pending && self.tracker.has_active() {
            self.clock.snap_phrase();
            self.phrase_restart_pending = false;
        }
        let step_id = self.clock.begin_step();
        if !self.tracker.has_active() {
            return;
        }
        let rhythm_step = match self.config.retrigger_mode {
            RetriggerMode::Restart => step_id.saturating_sub(self.clock.phrase_anchor_step()),
            RetriggerMode::Cont => step_id,
        };
        let pool = build_register(&self.config, &self.tracker);
        for (lane_idx, lane) in self.lanes.iter().enumerate() {
            if out.is_full() {
                break;
            }
            if let Some(hit) = evaluate_lane(&self.config, lane, lane_idx, rhythm_step, &pool) {
                let gate = if hit.gate == 0 {
                    None
                } else {
                    Some(self.clock.gate_len(hit.gate))
                };
                self.voices.schedule(
                    hit.pitch,
                    hit.velocity,
                    gate,
                    usize::from(self.config.max_voices),
                    out,
                );
            }
        }
    }

    /// Transport stop: CC123 first, then the flush, then a full reset.
    fn handle_stop(&mut self, out: &mut EventBuffer) {
        out.push(RawMidi::all_notes_off());
        self.voices.flush(out);
        self.clock.on_stop();
        self.tracker.clear(self.config.play_mode);
        self.phrase_restart_pending = false;
    }

    fn handle_start(&mut self) {
        self.clock.on_start();
        self.phrase_restart_pending = self.config.retrigger_mode == RetriggerMode::Restart;
    }

    fn note_on(&mut self, note: u8) {
        let was_active = self.tracker.has_active();
        let replaced_latch = self.tracker.note_on(note, self.config.play_mode);
        let became_active = !was_active && self.tracker.has_active();
        if (replaced_latch || became_active)
            && self.config.retrigger_mode == RetriggerMode::Restart
        {
            self.phrase_restart_pending = true;
            log::debug!(target: "eucalypso::engine", "phrase restart armed by note {}", note);
        }
    }

    fn note_off(&mut self, note: u8, out: &mut EventBuffer) {
        let was_active = self.tracker.has_active();
        self.tracker.note_off(note, self.config.play_mode);
        // An emptied phrase in free-running internal restart mode would
        // otherwise leave its tail notes gated open until the next phrase.
        if was_active
            && !self.tracker.has_active()
            && self.config.sync == SyncMode::Internal
            && self.config.retrigger_mode == RetriggerMode::Restart
        {
            self.voices.flush(out);
        }
    }
}

impl Default for Eucalypso {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiFx for Eucalypso {
    fn process_midi(&mut self, msg: &[u8], out: &mut EventBuffer) {
        let parsed = MidiMessage::parse(msg);
        match parsed {
            Some(MidiMessage::Start) => self.handle_start(),
            Some(MidiMessage::Continue) => {
                self.clock.on_continue();
                if self.config.sync == SyncMode::Internal {
                    // Internal sync has no position to resume; Continue
                    // re-anchors like Start.
                    self.phrase_restart_pending =
                        self.config.retrigger_mode == RetriggerMode::Restart;
                }
            }
            Some(MidiMessage::Stop) => self.handle_stop(out),
            Some(MidiMessage::Clock) => {
                if self.config.sync == SyncMode::Clock {
                    if self.clock.is_running() {
                        // Gate timers run on the external tick grid.
                        self.voices.advance_ticks(out);
                        self.clock.on_clock_tick();
                    }
                } else {
                    // Not ours to consume while free-running internally.
                    out.push(RawMidi::passthrough(msg));
                }
            }
            Some(MidiMessage::NoteOn { note, .. }) => self.note_on(note),
            Some(MidiMessage::NoteOff { note }) => self.note_off(note, out),
            None => {
                out.push(RawMidi::passthrough(msg));
            }
        }
    }

    fn tick(&mut self, frames: u32, sample_rate: u32, out: &mut EventBuffer) {
        self.clock.update_sample_rate(sample_rate);
        match self.config.sync {
            SyncMode::Internal => {
                self.voices.advance_frames(u64::from(frames), out);
                if out.is_full() || !self.clock.is_running() {
                    return;
                }
                self.clock.add_frames(frames);
                while self.clock.internal_step_due() && !out.is_full() {
                    self.run_anchor_step(out);
                    self.clock.complete_internal_step();
                }
            }
            SyncMode::Clock => {
                while !out.is_full() && self.clock.pop_pending() {
                    self.run_anchor_step(out);
                }
            }
        }
    }

    fn set_param(&mut self, key: &str, value: &str) {
        params::set(self, key, value);
    }

    fn get_param(&self, key: &str) -> Option<String> {
        params::get(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf() -> EventBuffer {
        EventBuffer::new(64)
    }

    #[test]
    fn defaults_enable_only_lane_one() {
        let fx = Eucalypso::new();
        assert!(fx.lanes[0].enabled);
        assert!(!fx.lanes[1].enabled);
        assert_eq!(fx.lanes[3].note, 4);
    }

    #[test]
    fn unrecognized_messages_pass_through() {
        let mut fx = Eucalypso::new();
        let mut out = buf();
        fx.process_midi(&[0xB0, 1, 64], &mut out);
        assert_eq!(out.events()[0].as_bytes(), &[0xB0, 1, 64]);
    }

    #[test]
    fn clock_bytes_pass_through_in_internal_sync() {
        let mut fx = Eucalypso::new();
        let mut out = buf();
        fx.process_midi(&[0xF8], &mut out);
        assert_eq!(out.events()[0].as_bytes(), &[0xF8]);
    }

    #[test]
    fn clock_bytes_consumed_in_clock_sync() {
        let mut fx = Eucalypso::new();
        fx.set_param("sync", "clock");
        let mut out = buf();
        fx.process_midi(&[0xF8], &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn note_events_emit_nothing_directly() {
        let mut fx = Eucalypso::new();
        let mut out = buf();
        fx.process_midi(&[0x90, 60, 100], &mut out);
        fx.process_midi(&[0x80, 60, 0], &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn stop_leads_with_all_notes_off() {
        let mut fx = Eucalypso::new();
        let mut out = buf();
        fx.process_midi(&[0x90, 60, 100], &mut out);
        fx.tick(12_000, 48_000, &mut out); // two steps' worth at defaults
        assert!(!out.is_empty());

        let mut stop_out = buf();
        fx.process_midi(&[0xFC], &mut stop_out);
        assert_eq!(stop_out.events()[0].as_bytes(), &[0xB0, 123, 0]);
        assert_eq!(fx.open_voices(), 0);
    }

    #[test]
    fn stop_clears_note_state() {
        let mut fx = Eucalypso::new();
        let mut out = buf();
        fx.process_midi(&[0x90, 60, 100], &mut out);
        fx.process_midi(&[0xFC], &mut out);
        out.clear();
        // The released state emits nothing on subsequent steps.
        fx.tick(48_000, 48_000, &mut out);
        assert!(out.is_empty());
    }
}
