use serde::{Deserialize, Serialize};

/// Scale definition as semitone intervals from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    Major,
    NaturalMinor,
    HarmonicMinor,
    MelodicMinor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    PentatonicMajor,
    PentatonicMinor,
    Blues,
    WholeTone,
    Chromatic,
}

impl ScaleMode {
    pub const ALL: [ScaleMode; 14] = [
        ScaleMode::Major,
        ScaleMode::NaturalMinor,
        ScaleMode::HarmonicMinor,
        ScaleMode::MelodicMinor,
        ScaleMode::Dorian,
        ScaleMode::Phrygian,
        ScaleMode::Lydian,
        ScaleMode::Mixolydian,
        ScaleMode::Locrian,
        ScaleMode::PentatonicMajor,
        ScaleMode::PentatonicMinor,
        ScaleMode::Blues,
        ScaleMode::WholeTone,
        ScaleMode::Chromatic,
    ];

    /// Canonical parameter-surface name.
    pub fn name(&self) -> &'static str {
        match self {
            ScaleMode::Major => "major",
            ScaleMode::NaturalMinor => "natural_minor",
            ScaleMode::HarmonicMinor => "harmonic_minor",
            ScaleMode::MelodicMinor => "melodic_minor",
            ScaleMode::Dorian => "dorian",
            ScaleMode::Phrygian => "phrygian",
            ScaleMode::Lydian => "lydian",
            ScaleMode::Mixolydian => "mixolydian",
            ScaleMode::Locrian => "locrian",
            ScaleMode::PentatonicMajor => "pentatonic_major",
            ScaleMode::PentatonicMinor => "pentatonic_minor",
            ScaleMode::Blues => "blues",
            ScaleMode::WholeTone => "whole_tone",
            ScaleMode::Chromatic => "chromatic",
        }
    }

    pub fn parse(name: &str) -> Option<ScaleMode> {
        ScaleMode::ALL.iter().copied().find(|m| m.name() == name)
    }

    /// Semitone intervals from root for this scale.
    pub fn intervals(&self) -> &'static [i8] {
        match self {
            ScaleMode::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleMode::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleMode::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleMode::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            ScaleMode::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleMode::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleMode::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            ScaleMode::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleMode::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            ScaleMode::PentatonicMajor => &[0, 2, 4, 7, 9],
            ScaleMode::PentatonicMinor => &[0, 3, 5, 7, 10],
            ScaleMode::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleMode::WholeTone => &[0, 2, 4, 6, 8, 10],
            ScaleMode::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }
}

impl Default for ScaleMode {
    fn default() -> Self {
        ScaleMode::Major
    }
}
