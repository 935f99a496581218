/// All localized user-facing strings for a language
///
/// Every field is populated for every supported language; there is no
/// missing-key case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageStrings {
    // ==================== Completion ====================
    /// Title shown on the confirmation screen after completion
    pub thank_you_title: &'static str,

    /// Body shown on the confirmation screen after completion
    pub thank_you_message: &'static str,

    // ==================== Shell ====================
    /// Shown while a form definition is being fetched
    pub loading: &'static str,

    /// Label of the language switcher; names the *other* language
    pub switch_language: &'static str,

    // ==================== Fallback Form ====================
    /// Title of the substitute form shown when a definition cannot be loaded
    pub form_not_found_title: &'static str,

    /// HTML body of the substitute form
    pub form_not_found_message: &'static str,
}

impl LanguageStrings {
    /// All fields, for completeness checks.
    pub fn fields(&self) -> [&'static str; 6] {
        [
            self.thank_you_title,
            self.thank_you_message,
            self.loading,
            self.switch_language,
            self.form_not_found_title,
            self.form_not_found_message,
        ]
    }
}

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    thank_you_title: "Thank you for participating!",
    thank_you_message: "We appreciate your feedback and participation in our survey.",
    loading: "Loading survey...",
    switch_language: "Français",
    form_not_found_title: "Form Not Found",
    form_not_found_message:
        "<p>The requested form could not be loaded. Please check the URL and try again.</p>",
};

// ==================== French Strings ====================

pub const FRENCH_STRINGS: LanguageStrings = LanguageStrings {
    thank_you_title: "Merci de votre participation !",
    thank_you_message:
        "Nous apprécions vos commentaires et votre participation à notre enquête.",
    loading: "Chargement de l'enquête...",
    switch_language: "English",
    form_not_found_title: "Formulaire non trouvé",
    form_not_found_message: "<p>Le formulaire demandé n'a pas pu être chargé. \
Veuillez vérifier l'URL et réessayer.</p>",
};
