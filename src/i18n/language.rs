//! Language type: validated language representation plus resolution rules.

use crate::i18n::strings::{ENGLISH_STRINGS, FRENCH_STRINGS};
use crate::i18n::{LanguageConfig, LanguageRegistry, LanguageStrings};
use anyhow::{bail, Result};
use std::fmt;

/// A validated language.
///
/// Only languages present in the registry can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "fr")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };

    pub const FRENCH: Language = Language { code: "fr" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is registered
    /// * `Err` if the code is unknown
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) => Ok(Language { code: config.code }),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The language used when nothing else applies.
    pub fn default_language() -> Language {
        Language {
            code: LanguageRegistry::get().default_language().code,
        }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Never for a `Language` built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// The other language of the bilingual pair.
    ///
    /// Only meaningful while exactly two languages are registered.
    pub fn toggled(&self) -> Language {
        if *self == Language::FRENCH {
            Language::ENGLISH
        } else {
            Language::FRENCH
        }
    }

    /// The fixed UI string table for this language.
    pub fn strings(&self) -> &'static LanguageStrings {
        strings_for(*self)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

/// Fixed string table lookup. Total over the supported set.
pub fn strings_for(language: Language) -> &'static LanguageStrings {
    match language.code() {
        "fr" => &FRENCH_STRINGS,
        _ => &ENGLISH_STRINGS,
    }
}

/// Extract the lowercased primary subtag of a browser language tag.
///
/// Accepts BCP 47 tags (`fr-CA`) as well as POSIX locales (`fr_CA.UTF-8`).
pub fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split(['-', '_', '.', '@'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Pick the session language.
///
/// Precedence: a supported URL tag, then the primary subtag of the browser
/// tag, then the default language.
pub fn resolve_language(url_tag: Option<&str>, browser_tag: Option<&str>) -> Language {
    if let Some(language) = url_tag.and_then(|tag| Language::from_code(tag).ok()) {
        return language;
    }

    if let Some(language) = browser_tag
        .map(primary_subtag)
        .and_then(|tag| Language::from_code(&tag).ok())
    {
        return language;
    }

    Language::default_language()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_english_constant() {
        assert_eq!(Language::ENGLISH.code(), "en");
        assert_eq!(Language::ENGLISH.config().name, "English");
    }

    #[test]
    fn test_french_constant() {
        assert_eq!(Language::FRENCH.code(), "fr");
        assert_eq!(Language::FRENCH.config().native_name, "Français");
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_french() {
        let language = Language::from_code("fr").expect("Should succeed");
        assert_eq!(language, Language::FRENCH);
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("es");
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_default_is_english() {
        assert_eq!(Language::default_language(), Language::ENGLISH);
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::FRENCH.to_string(), "fr");
    }

    // ==================== Toggle Tests ====================

    #[test]
    fn test_toggled_flips() {
        assert_eq!(Language::ENGLISH.toggled(), Language::FRENCH);
        assert_eq!(Language::FRENCH.toggled(), Language::ENGLISH);
    }

    #[test]
    fn test_toggled_is_involution() {
        for language in [Language::ENGLISH, Language::FRENCH] {
            assert_eq!(language.toggled().toggled(), language);
        }
    }

    // ==================== Strings Tests ====================

    #[test]
    fn test_strings_for_every_registered_language() {
        for config in LanguageRegistry::get().list() {
            let language = Language::from_code(config.code).unwrap();
            let strings = strings_for(language);
            assert!(strings.fields().iter().all(|s| !s.is_empty()));
        }
    }

    #[test]
    fn test_switch_label_is_native_name_of_toggled_language() {
        for language in [Language::ENGLISH, Language::FRENCH] {
            assert_eq!(
                language.strings().switch_language,
                language.toggled().config().native_name
            );
        }
    }

    #[test]
    fn test_strings_for_french() {
        assert_eq!(
            Language::FRENCH.strings().thank_you_title,
            "Merci de votre participation !"
        );
    }

    // ==================== primary_subtag Tests ====================

    #[test]
    fn test_primary_subtag_variants() {
        assert_eq!(primary_subtag("fr-CA"), "fr");
        assert_eq!(primary_subtag("fr_CA.UTF-8"), "fr");
        assert_eq!(primary_subtag("EN-us"), "en");
        assert_eq!(primary_subtag("de"), "de");
        assert_eq!(primary_subtag(""), "");
    }

    // ==================== resolve_language Tests ====================

    #[test]
    fn test_resolve_url_wins() {
        assert_eq!(
            resolve_language(Some("fr"), Some("en-US")),
            Language::FRENCH
        );
    }

    #[test]
    fn test_resolve_falls_back_to_browser() {
        assert_eq!(
            resolve_language(Some("de"), Some("fr-BE")),
            Language::FRENCH
        );
        assert_eq!(resolve_language(None, Some("fr")), Language::FRENCH);
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        assert_eq!(
            resolve_language(Some("de"), Some("es-ES")),
            Language::ENGLISH
        );
        assert_eq!(resolve_language(None, None), Language::ENGLISH);
    }

    #[test]
    fn test_resolve_url_tag_is_not_normalized() {
        // Only the browser tag is reduced to its primary subtag.
        assert_eq!(resolve_language(Some("fr-CA"), None), Language::ENGLISH);
    }

    proptest! {
        #[test]
        fn prop_supported_url_tag_always_wins(
            url in prop::sample::select(vec!["en", "fr"]),
            browser in ".*",
        ) {
            let resolved = resolve_language(Some(url), Some(browser.as_str()));
            prop_assert_eq!(resolved.code(), url);
        }

        #[test]
        fn prop_unsupported_url_defers_to_supported_browser(
            url in "[a-z]{3}",
            browser in prop::sample::select(vec!["en", "fr", "fr-CA", "en-GB"]),
        ) {
            let resolved = resolve_language(Some(url.as_str()), Some(browser));
            prop_assert_eq!(resolved.code(), primary_subtag(browser));
        }

        #[test]
        fn prop_nothing_supported_yields_default(
            url in "[g-z]{2}",
            browser in "[g-z]{2}(-[A-Z]{2})?",
        ) {
            let resolved = resolve_language(Some(url.as_str()), Some(browser.as_str()));
            prop_assert_eq!(resolved, Language::ENGLISH);
        }
    }
}
