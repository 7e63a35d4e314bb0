//! Species data model
//!
//! # Components
//!
//! - `SpeciesRecord`: one species (or one variety of it) with its forms and evolutions
//! - `ElementalType`, `Arctype`, `FormKind`: closed classifications of a record
//! - `SpriteSet`: sprite links and their decoded images

mod kinds;
pub(crate) mod record;
mod sprites;

pub use kinds::{Arctype, ElementalType, FormKind, ULTRA_BEAST_RANGES};
pub use record::SpeciesRecord;
pub use sprites::{Sprite, SpriteEntry, SpriteKind, SpriteSet};
