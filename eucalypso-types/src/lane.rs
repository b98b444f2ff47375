use serde::{Deserialize, Serialize};

use crate::MAX_REGISTER_NOTES;

/// Signed octave-jump pool a lane's randomizer draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OctaveRange {
    Plus1,
    Minus1,
    PlusMinus1,
    Plus2,
    Minus2,
    PlusMinus2,
}

impl OctaveRange {
    pub const ALL: [OctaveRange; 6] = [
        OctaveRange::Plus1,
        OctaveRange::Minus1,
        OctaveRange::PlusMinus1,
        OctaveRange::Plus2,
        OctaveRange::Minus2,
        OctaveRange::PlusMinus2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OctaveRange::Plus1 => "+1",
            OctaveRange::Minus1 => "-1",
            OctaveRange::PlusMinus1 => "+-1",
            OctaveRange::Plus2 => "+2",
            OctaveRange::Minus2 => "-2",
            OctaveRange::PlusMinus2 => "+-2",
        }
    }

    pub fn parse(name: &str) -> Option<OctaveRange> {
        OctaveRange::ALL.iter().copied().find(|r| r.name() == name)
    }

    /// Candidate octave offsets, zero included so a triggered jump can still
    /// land on the home octave for the symmetric ranges.
    pub fn offsets(&self) -> &'static [i8] {
        match self {
            OctaveRange::Plus1 => &[0, 1],
            OctaveRange::Minus1 => &[-1, 0],
            OctaveRange::PlusMinus1 => &[-1, 0, 1],
            OctaveRange::Plus2 => &[0, 1, 2],
            OctaveRange::Minus2 => &[-2, -1, 0],
            OctaveRange::PlusMinus2 => &[-2, -1, 0, 1, 2],
        }
    }
}

impl Default for OctaveRange {
    fn default() -> Self {
        OctaveRange::PlusMinus1
    }
}

/// One Euclidean rhythm lane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneConfig {
    pub enabled: bool,
    pub steps: u8,    // 1-128
    pub pulses: u8,   // 0-steps
    pub rotation: u8, // 0-(steps-1)
    pub drop: u8,     // 0-100 chance a hit emits nothing
    pub drop_seed: u16,
    pub note: u8, // 1-24 register index
    pub note_rnd: u8,
    pub note_seed: u16,
    pub octave: i8, // -3..=3 lane transpose
    pub oct_rnd: u8,
    pub oct_seed: u16,
    pub oct_range: OctaveRange,
    pub velocity: u8, // 0 inherits the global velocity
    pub gate: u16,    // 0 inherits the global gate
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            steps: 16,
            pulses: 4,
            rotation: 0,
            drop: 0,
            drop_seed: 0,
            note: 1,
            note_rnd: 0,
            note_seed: 0,
            octave: 0,
            oct_rnd: 0,
            oct_seed: 0,
            oct_range: OctaveRange::default(),
            velocity: 0,
            gate: 0,
        }
    }
}

impl LaneConfig {
    /// Clamp every field into range. Pulses and rotation are re-bounded
    /// against the (possibly just-changed) step count.
    pub fn normalize(&mut self) {
        self.steps = self.steps.clamp(1, 128);
        self.pulses = self.pulses.min(self.steps);
        self.rotation = self.rotation.min(self.steps - 1);
        self.drop = self.drop.min(100);
        self.note = self.note.clamp(1, MAX_REGISTER_NOTES as u8);
        self.note_rnd = self.note_rnd.min(100);
        self.octave = self.octave.clamp(-3, 3);
        self.oct_rnd = self.oct_rnd.min(100);
        self.velocity = self.velocity.min(127);
        self.gate = self.gate.min(1600);
    }
}
