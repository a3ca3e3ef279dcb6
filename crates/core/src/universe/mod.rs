//! Universe module - the user's portfolio, loaded from a spreadsheet export.

mod loader;
mod model;

pub use loader::UniverseLoader;
pub use model::{UniverseInstrument, UniverseLoadResult};
