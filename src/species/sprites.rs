/// Sprite links and decoded sprite images
use image::ImageFormat;
use std::fmt;
use std::io::Cursor;

/// Which of the four sprite variants a link or image belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Male,
    MaleShiny,
    Female,
    FemaleShiny,
}

impl SpriteKind {
    pub const ALL: [SpriteKind; 4] = [
        Self::Male,
        Self::MaleShiny,
        Self::Female,
        Self::FemaleShiny,
    ];

    /// Suffix appended to exported file names; the default sprite has none
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Self::Male => "",
            Self::MaleShiny => "-shiny",
            Self::Female => "-female",
            Self::FemaleShiny => "-female-shiny",
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::MaleShiny => "male-shiny",
            Self::Female => "female",
            Self::FemaleShiny => "female-shiny",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.to_db_string() == s)
    }
}

/// A decoded sprite, kept as PNG bytes so it can be persisted and exported as-is
#[derive(Clone, PartialEq, Eq)]
pub struct Sprite {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl Sprite {
    /// Decodes an image in any supported format and re-encodes it as PNG
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let decoded = image::load_from_memory(bytes)?;
        let mut png = Vec::new();
        decoded.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            png,
        })
    }
}

impl fmt::Debug for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sprite")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_bytes", &self.png.len())
            .finish()
    }
}

/// A sprite link together with its resolved image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteEntry {
    pub link: String,
    pub image: Option<Sprite>,
}

impl SpriteEntry {
    pub fn unresolved(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            image: None,
        }
    }
}

/// The four optional sprites of a species variety
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpriteSet {
    pub male: Option<SpriteEntry>,
    pub male_shiny: Option<SpriteEntry>,
    pub female: Option<SpriteEntry>,
    pub female_shiny: Option<SpriteEntry>,
}

impl SpriteSet {
    /// Exact entry for `kind`, without fallback
    pub fn entry(&self, kind: SpriteKind) -> Option<&SpriteEntry> {
        match kind {
            SpriteKind::Male => self.male.as_ref(),
            SpriteKind::MaleShiny => self.male_shiny.as_ref(),
            SpriteKind::Female => self.female.as_ref(),
            SpriteKind::FemaleShiny => self.female_shiny.as_ref(),
        }
    }

    pub fn entry_mut(&mut self, kind: SpriteKind) -> &mut Option<SpriteEntry> {
        match kind {
            SpriteKind::Male => &mut self.male,
            SpriteKind::MaleShiny => &mut self.male_shiny,
            SpriteKind::Female => &mut self.female,
            SpriteKind::FemaleShiny => &mut self.female_shiny,
        }
    }

    /// Entry for `kind`, falling back the way a viewer would
    ///
    /// Female falls back to male, male shiny to male, female shiny to female.
    pub fn resolve(&self, kind: SpriteKind) -> Option<&SpriteEntry> {
        let resolved = |k| self.entry(k).filter(|e| e.image.is_some());
        match kind {
            SpriteKind::Male => self.entry(SpriteKind::Male),
            SpriteKind::MaleShiny | SpriteKind::Female => {
                resolved(kind).or_else(|| self.entry(SpriteKind::Male))
            }
            SpriteKind::FemaleShiny => {
                resolved(kind).or_else(|| self.resolve(SpriteKind::Female))
            }
        }
    }

    pub fn image(&self, kind: SpriteKind) -> Option<&Sprite> {
        self.resolve(kind).and_then(|e| e.image.as_ref())
    }

    pub fn link(&self, kind: SpriteKind) -> Option<&str> {
        self.resolve(kind).map(|e| e.link.as_str())
    }

    /// Present entries in `SpriteKind::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (SpriteKind, &SpriteEntry)> + '_ {
        SpriteKind::ALL
            .into_iter()
            .filter_map(move |kind| self.entry(kind).map(|e| (kind, e)))
    }

    pub fn has_any_image(&self) -> bool {
        self.iter().any(|(_, e)| e.image.is_some())
    }
}
