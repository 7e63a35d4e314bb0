/// Closed classifications attached to a species record
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Species identifiers classified as ultra beasts when the source flags
/// them as neither legendary nor mythical
pub const ULTRA_BEAST_RANGES: [RangeInclusive<u32>; 2] = [793..=799, 803..=806];

/// Elemental type of a species variety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementalType {
    None,
    Bug,
    Dark,
    Dragon,
    Electric,
    Fairy,
    Fighting,
    Fire,
    Flying,
    Ghost,
    Grass,
    Ground,
    Ice,
    Normal,
    Poison,
    Psychic,
    Rock,
    Steel,
    Water,
}

impl ElementalType {
    pub const ALL: [ElementalType; 19] = [
        Self::None,
        Self::Bug,
        Self::Dark,
        Self::Dragon,
        Self::Electric,
        Self::Fairy,
        Self::Fighting,
        Self::Fire,
        Self::Flying,
        Self::Ghost,
        Self::Grass,
        Self::Ground,
        Self::Ice,
        Self::Normal,
        Self::Poison,
        Self::Psychic,
        Self::Rock,
        Self::Steel,
        Self::Water,
    ];

    /// Lowercase name as used by the remote source and the catalog file
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bug => "bug",
            Self::Dark => "dark",
            Self::Dragon => "dragon",
            Self::Electric => "electric",
            Self::Fairy => "fairy",
            Self::Fighting => "fighting",
            Self::Fire => "fire",
            Self::Flying => "flying",
            Self::Ghost => "ghost",
            Self::Grass => "grass",
            Self::Ground => "ground",
            Self::Ice => "ice",
            Self::Normal => "normal",
            Self::Poison => "poison",
            Self::Psychic => "psychic",
            Self::Rock => "rock",
            Self::Steel => "steel",
            Self::Water => "water",
        }
    }
}

impl FromStr for ElementalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| format!("unknown elemental type '{}'", s))
    }
}

impl fmt::Display for ElementalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => Ok(()),
        }
    }
}

/// Rarity/category classification of a species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arctype {
    Normal,
    Legendary,
    Mythical,
    UltraBeast,
}

impl Arctype {
    pub const ALL: [Arctype; 4] = [
        Self::Normal,
        Self::Legendary,
        Self::Mythical,
        Self::UltraBeast,
    ];

    /// Classifies a species
    ///
    /// Precedence: legendary flag, then mythical flag, then the ultra beast
    /// identifier ranges, then normal.
    pub fn classify(id: u32, is_legendary: bool, is_mythical: bool) -> Self {
        if is_legendary {
            Self::Legendary
        } else if is_mythical {
            Self::Mythical
        } else if ULTRA_BEAST_RANGES.iter().any(|range| range.contains(&id)) {
            Self::UltraBeast
        } else {
            Self::Normal
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Legendary => "legendary",
            Self::Mythical => "mythical",
            Self::UltraBeast => "ultra-beast",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.to_db_string() == s)
    }
}

impl fmt::Display for Arctype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Normal => "Normal",
            Self::Legendary => "Legendary",
            Self::Mythical => "Mythical",
            Self::UltraBeast => "Ultra Beast",
        };
        write!(f, "{}", label)
    }
}

/// Coarse category of a variety, derived from its form name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Default,
    Mega,
    Gmax,
    Alola,
    Galar,
    Other,
}

impl FormKind {
    pub fn from_form_name(form_name: &str) -> Self {
        let lowered = form_name.to_ascii_lowercase();
        if lowered.is_empty() {
            Self::Default
        } else if lowered.starts_with("mega") {
            Self::Mega
        } else if lowered == "gmax" {
            Self::Gmax
        } else if lowered.starts_with("alola") {
            Self::Alola
        } else if lowered.starts_with("galar") {
            Self::Galar
        } else {
            Self::Other
        }
    }
}
