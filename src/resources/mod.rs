//! Resource types exposed by the API
//!
//! Each module pairs the adapter of a type with its controller.

pub mod locale;
pub mod translation;

pub use locale::{LOCALES, LocaleAdapter, LocaleController, LocaleFilter};
pub use translation::{
    TRANSLATIONS, Translation, TranslationAdapter, TranslationController, TranslationDraft,
    TranslationFilter, TranslationId,
};
