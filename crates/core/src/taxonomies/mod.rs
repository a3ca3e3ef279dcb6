//! Taxonomies module - category systems and the translation table between them.

mod mapping;

pub use mapping::{
    assogestioni_to_morningstar, morningstar_to_assogestioni, CATEGORY_MAPPING,
};
