//! Storage implementations for the i18n collaborators

pub mod in_memory;

pub use in_memory::{InMemoryI18n, InMemoryTranslator};
