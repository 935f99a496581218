use std::fmt;
use tracing::debug;

/// Where unmatched paths are sent.
pub const DEFAULT_LANGUAGE_SEGMENT: &str = "en";
pub const DEFAULT_FORM_KEY: &str = "default";

/// Parameters of a `/{language}/{form_key}` route.
///
/// `language` is the raw URL segment; it may name an unsupported language,
/// in which case language resolution falls back to browser and default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub language: String,
    pub form_key: String,
}

impl Route {
    /// Parse a path. Query string and fragment are ignored.
    ///
    /// Returns `None` unless the path has exactly two non-empty segments.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches('/');

        let mut segments = path.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(language), Some(form_key), None)
                if !language.is_empty() && !form_key.is_empty() =>
            {
                Some(Route {
                    language: language.to_string(),
                    form_key: form_key.to_string(),
                })
            }
            _ => None,
        }
    }

    /// Parse a path, redirecting anything unmatched to the default route.
    pub fn resolve(path: &str) -> Route {
        Route::parse(path).unwrap_or_else(|| {
            debug!("No route matches '{}', redirecting to default", path);
            Route::default()
        })
    }

    pub fn path(&self) -> String {
        format!("/{}/{}", self.language, self.form_key)
    }
}

impl Default for Route {
    fn default() -> Self {
        Route {
            language: DEFAULT_LANGUAGE_SEGMENT.to_string(),
            form_key: DEFAULT_FORM_KEY.to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
