//! Instrument difficulty coefficients and comfortable pitch ranges.
//!
//! The catalog is plain data handed to the analysis engine at construction
//! time. Lookups are total: an unknown instrument resolves to the catalog's
//! explicit default profile.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad instrument family, used for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentFamily {
    Keyboard,
    String,
    Wind,
    Percussion,
    Vocal,
    #[default]
    Other,
}

impl fmt::Display for InstrumentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentFamily::Keyboard => write!(f, "keyboard"),
            InstrumentFamily::String => write!(f, "string"),
            InstrumentFamily::Wind => write!(f, "wind"),
            InstrumentFamily::Percussion => write!(f, "percussion"),
            InstrumentFamily::Vocal => write!(f, "vocal"),
            InstrumentFamily::Other => write!(f, "other"),
        }
    }
}

/// Difficulty coefficients and pitch ranges for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    /// Multiplier applied to tempo before the tempo penalty.
    pub tempo_coefficient: f64,
    /// Multiplier applied to the mean leap before the leap penalty.
    pub leap_coefficient: f64,
    /// Lowest playable MIDI pitch.
    pub min: u8,
    /// Highest playable MIDI pitch.
    pub max: u8,
    /// Lowest comfortable MIDI pitch.
    pub comfortable_min: u8,
    /// Highest comfortable MIDI pitch.
    pub comfortable_max: u8,
    #[serde(default)]
    pub family: InstrumentFamily,
}

impl InstrumentProfile {
    /// The fallback profile for instruments the catalog does not know.
    pub const DEFAULT: InstrumentProfile = InstrumentProfile {
        tempo_coefficient: 1.0,
        leap_coefficient: 1.0,
        min: 40,
        max: 88,
        comfortable_min: 48,
        comfortable_max: 84,
        family: InstrumentFamily::Other,
    };

    const fn new(
        family: InstrumentFamily,
        tempo_coefficient: f64,
        leap_coefficient: f64,
        (min, max): (u8, u8),
        (comfortable_min, comfortable_max): (u8, u8),
    ) -> Self {
        Self {
            tempo_coefficient,
            leap_coefficient,
            min,
            max,
            comfortable_min,
            comfortable_max,
            family,
        }
    }

    /// The tempo and leap coefficients.
    pub fn coefficients(&self) -> Coefficients {
        Coefficients {
            tempo: self.tempo_coefficient,
            leap: self.leap_coefficient,
        }
    }

    /// The playable and comfortable pitch ranges.
    pub fn range(&self) -> PitchRange {
        PitchRange {
            min: self.min,
            max: self.max,
            comfortable_min: self.comfortable_min,
            comfortable_max: self.comfortable_max,
        }
    }
}

impl Default for InstrumentProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Tempo and leap difficulty multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub tempo: f64,
    pub leap: f64,
}

/// Playable and comfortable MIDI pitch ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchRange {
    pub min: u8,
    pub max: u8,
    pub comfortable_min: u8,
    pub comfortable_max: u8,
}

/// Normalize an instrument name: trimmed, lowercase, whitespace runs
/// replaced by `_`.
pub fn normalize_instrument_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Immutable lookup table of instrument profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentCatalog {
    profiles: HashMap<String, InstrumentProfile>,
    default_profile: InstrumentProfile,
}

impl InstrumentCatalog {
    /// Build a catalog from explicit profiles and a fallback. Keys are
    /// normalized on insertion.
    pub fn new(
        profiles: impl IntoIterator<Item = (String, InstrumentProfile)>,
        default_profile: InstrumentProfile,
    ) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|(name, profile)| (normalize_instrument_name(&name), profile))
                .collect(),
            default_profile,
        }
    }

    /// The built-in catalog of common instruments.
    pub fn standard() -> Self {
        use InstrumentFamily as Family;

        #[rustfmt::skip]
        let table = [
            // Keyboard
            ("piano", InstrumentProfile::new(Family::Keyboard, 1.0, 1.0, (21, 108), (36, 96))),
            ("keyboard", InstrumentProfile::new(Family::Keyboard, 1.0, 1.0, (36, 96), (48, 84))),
            ("organ", InstrumentProfile::new(Family::Keyboard, 1.0, 1.0, (36, 96), (48, 84))),
            ("harpsichord", InstrumentProfile::new(Family::Keyboard, 1.0, 1.0, (29, 89), (41, 84))),
            ("accordion", InstrumentProfile::new(Family::Keyboard, 1.1, 1.1, (41, 93), (53, 84))),
            // String
            ("guitar", InstrumentProfile::new(Family::String, 1.2, 1.3, (40, 88), (40, 76))),
            ("electric_guitar", InstrumentProfile::new(Family::String, 1.2, 1.2, (40, 88), (40, 81))),
            ("ukulele", InstrumentProfile::new(Family::String, 1.1, 1.2, (60, 81), (60, 79))),
            ("violin", InstrumentProfile::new(Family::String, 1.2, 1.3, (55, 103), (55, 88))),
            ("viola", InstrumentProfile::new(Family::String, 1.2, 1.3, (48, 91), (48, 81))),
            ("cello", InstrumentProfile::new(Family::String, 1.3, 1.4, (36, 84), (36, 72))),
            ("double_bass", InstrumentProfile::new(Family::String, 1.4, 1.5, (28, 67), (28, 60))),
            ("bass", InstrumentProfile::new(Family::String, 1.3, 1.4, (28, 67), (28, 60))),
            // Wind
            ("flute", InstrumentProfile::new(Family::Wind, 1.2, 1.3, (60, 96), (60, 91))),
            ("recorder", InstrumentProfile::new(Family::Wind, 1.1, 1.2, (72, 98), (72, 93))),
            ("clarinet", InstrumentProfile::new(Family::Wind, 1.2, 1.3, (50, 94), (52, 86))),
            ("saxophone", InstrumentProfile::new(Family::Wind, 1.2, 1.3, (49, 81), (51, 77))),
            ("trumpet", InstrumentProfile::new(Family::Wind, 1.3, 1.4, (52, 82), (55, 77))),
            ("harmonica", InstrumentProfile::new(Family::Wind, 1.1, 1.2, (60, 96), (60, 84))),
            // Percussion
            ("drums", InstrumentProfile::new(Family::Percussion, 0.9, 0.3, (35, 81), (35, 81))),
            ("percussion", InstrumentProfile::new(Family::Percussion, 0.9, 0.3, (35, 81), (35, 81))),
            ("xylophone", InstrumentProfile::new(Family::Percussion, 1.0, 0.8, (65, 108), (65, 101))),
            ("marimba", InstrumentProfile::new(Family::Percussion, 1.0, 0.8, (45, 96), (48, 91))),
            // Vocal
            ("voice", InstrumentProfile::new(Family::Vocal, 1.0, 1.2, (48, 84), (55, 79))),
            ("soprano", InstrumentProfile::new(Family::Vocal, 1.0, 1.2, (60, 84), (62, 79))),
            ("alto", InstrumentProfile::new(Family::Vocal, 1.0, 1.2, (53, 77), (55, 74))),
            ("tenor", InstrumentProfile::new(Family::Vocal, 1.0, 1.2, (48, 72), (50, 69))),
        ];

        Self::new(
            table
                .into_iter()
                .map(|(name, profile)| (name.to_string(), profile)),
            InstrumentProfile::DEFAULT,
        )
    }

    /// Return a copy of this catalog with `name` added or replaced.
    pub fn with_profile(mut self, name: &str, profile: InstrumentProfile) -> Self {
        self.profiles
            .insert(normalize_instrument_name(name), profile);
        self
    }

    /// Look up a profile, falling back to the default profile.
    pub fn profile(&self, name: &str) -> &InstrumentProfile {
        self.profiles
            .get(&normalize_instrument_name(name))
            .unwrap_or(&self.default_profile)
    }

    /// Tempo and leap coefficients for an instrument.
    pub fn coefficients(&self, name: &str) -> Coefficients {
        self.profile(name).coefficients()
    }

    /// Pitch ranges for an instrument.
    pub fn range(&self, name: &str) -> PitchRange {
        self.profile(name).range()
    }

    /// Whether the catalog has an entry for `name` (after normalization).
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(&normalize_instrument_name(name))
    }

    /// The fallback profile.
    pub fn default_profile(&self) -> &InstrumentProfile {
        &self.default_profile
    }

    /// All known instrument names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
