//! Internationalization (i18n) module for the bilingual survey UI.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for the supported languages
//! - `language`: Type-safe `Language` plus URL/browser/default resolution
//! - `strings`: Fixed UI string tables
//! - `store`: Per-session current language with a change stream
//!
//! # Example
//!
//! ```rust,ignore
//! use survey_client::i18n::{Language, TranslationStore};
//!
//! let store = TranslationStore::default();
//! store.resolve(Some("fr"), None);
//! assert_eq!(store.current(), Language::FRENCH);
//! println!("{}", store.strings().loading);
//! ```

mod language;
mod registry;
mod store;
mod strings;

pub use language::{primary_subtag, resolve_language, strings_for, Language};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use store::TranslationStore;
pub use strings::LanguageStrings;
