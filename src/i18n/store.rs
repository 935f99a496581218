//! Per-session language selection with a change stream.

use crate::i18n::language::{resolve_language, Language};
use crate::i18n::LanguageStrings;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Holds the current language and publishes every change.
///
/// Cloning yields another handle on the same selection, so a language switcher
/// and the shell can share one store without any process-wide state.
#[derive(Debug, Clone)]
pub struct TranslationStore {
    current: Arc<watch::Sender<Language>>,
}

impl TranslationStore {
    pub fn new(initial: Language) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            current: Arc::new(tx),
        }
    }

    /// Resolve from URL tag, browser tag or default, and make it current.
    pub fn resolve(&self, url_tag: Option<&str>, browser_tag: Option<&str>) -> Language {
        let language = resolve_language(url_tag, browser_tag);
        self.set(language);
        language
    }

    pub fn current(&self) -> Language {
        *self.current.borrow()
    }

    /// Set the current language. Subscribers are notified even when the value
    /// does not change.
    pub fn set(&self, language: Language) {
        debug!("Language set to {}", language);
        self.current.send_replace(language);
    }

    /// Flip between the two supported languages.
    pub fn toggle(&self) -> Language {
        let next = self.current().toggled();
        self.set(next);
        next
    }

    pub fn strings(&self) -> &'static LanguageStrings {
        self.current().strings()
    }

    /// Subscribe to language changes. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<Language> {
        self.current.subscribe()
    }
}

impl Default for TranslationStore {
    fn default() -> Self {
        Self::new(Language::default_language())
    }
}
