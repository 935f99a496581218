//! Presentation shell: route → language → definition → renderer, and back.
//!
//! The rendering surface itself is an external collaborator behind
//! [`SurveyRenderer`]. It reports user activity as [`SurveyEvent`]s which the
//! shell routes to the current session's [`ResponseLifecycle`].

use crate::api::{Draft, FormDefinition, FormTransport};
use crate::config::Config;
use crate::i18n::{Language, LanguageStrings, TranslationStore};
use crate::lifecycle::{Outcome, ResponseLifecycle};
use crate::route::Route;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Header color when the definition does not carry one.
pub const DEFAULT_HEADER_COLOR: &str = "#ffffff";

/// Events raised by the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurveyEvent {
    /// An answer changed; the payload is the full current draft
    ValueChanged(Draft),
    /// The surface asked for an immediate partial save
    PartialSubmit(Draft),
    /// The user finished the form
    Complete(Draft),
}

/// Everything the renderer needs to draw a form.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyView {
    pub language: Language,
    pub title: String,
    /// Render-ready document (pages/elements)
    pub document: Value,
    pub logo_url: Option<String>,
    pub header_color: String,
    /// Label of the language switcher, naming the language it switches to
    pub switch_language: String,
    /// True when the definition could not be loaded and a stand-in is shown
    pub is_fallback: bool,
}

/// The capability the external rendering surface implements.
pub trait SurveyRenderer: Send {
    fn show_loading(&mut self, _message: &str) {}

    fn render(&mut self, view: &SurveyView);

    fn show_thank_you(&mut self, strings: &LanguageStrings);

    fn redirect(&mut self, url: &str);
}

/// Stand-in document shown when a definition cannot be fetched.
pub fn fallback_document(language: Language) -> Value {
    let strings = language.strings();
    json!({
        "title": strings.form_not_found_title,
        "pages": [{
            "name": "error",
            "elements": [{
                "type": "html",
                "name": "error_message",
                "html": strings.form_not_found_message,
            }]
        }]
    })
}

enum Content {
    Loaded(FormDefinition),
    NotFound,
}

struct Session {
    route: Route,
    content: Content,
    /// Absent for the fallback form, which has nothing to save
    lifecycle: Option<ResponseLifecycle>,
    outcome: Option<Outcome>,
}

pub struct SurveyShell<R> {
    transport: Arc<dyn FormTransport>,
    translations: TranslationStore,
    renderer: R,
    browser_language: Option<String>,
    logo_path: Option<String>,
    autosave_delay: Duration,
    session: Option<Session>,
}

impl<R: SurveyRenderer> SurveyShell<R> {
    pub fn new(
        config: &Config,
        transport: Arc<dyn FormTransport>,
        translations: TranslationStore,
        renderer: R,
    ) -> Self {
        Self {
            transport,
            translations,
            renderer,
            browser_language: None,
            logo_path: config.logo_path.clone(),
            autosave_delay: config.autosave_delay,
            session: None,
        }
    }

    /// Language reported by the browser/OS, used when the URL names none.
    pub fn with_browser_language(mut self, tag: Option<String>) -> Self {
        self.browser_language = tag;
        self
    }

    pub fn translations(&self) -> &TranslationStore {
        &self.translations
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn route(&self) -> Option<&Route> {
        self.session.as_ref().map(|s| &s.route)
    }

    pub fn lifecycle(&self) -> Option<&ResponseLifecycle> {
        self.session.as_ref().and_then(|s| s.lifecycle.as_ref())
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.session.as_ref().and_then(|s| s.outcome.as_ref())
    }

    /// Start a new session for `path`.
    ///
    /// The previous session is dropped first, which forgets its record id
    /// and cancels its pending autosave.
    pub async fn navigate(&mut self, path: &str) -> Route {
        let route = Route::resolve(path);
        let language = self
            .translations
            .resolve(Some(route.language.as_str()), self.browser_language.as_deref());

        self.session = None;
        info!("Opening form '{}' in {}", route.form_key, language);
        self.renderer.show_loading(language.strings().loading);

        let (content, lifecycle) = match self.transport.fetch_definition(&route.form_key).await {
            Ok(definition) => {
                let lifecycle = ResponseLifecycle::new(
                    Arc::clone(&self.transport),
                    &route.form_key,
                    self.autosave_delay,
                );
                (Content::Loaded(definition), Some(lifecycle))
            }
            Err(e) => {
                error!("Error loading form '{}': {}", route.form_key, e);
                (Content::NotFound, None)
            }
        };

        self.session = Some(Session {
            route: route.clone(),
            content,
            lifecycle,
            outcome: None,
        });
        self.render();
        route
    }

    /// Redraw the current session in the current language, without refetching.
    pub fn apply_language(&mut self) {
        debug!("Applying language {}", self.translations.current());
        self.render();
    }

    /// Route one renderer event to the session lifecycle.
    ///
    /// Returns the outcome when the event completed the form.
    pub async fn handle_event(&mut self, event: SurveyEvent) -> Option<Outcome> {
        let Some(session) = self.session.as_mut() else {
            debug!("Ignoring {:?} with no open form", event);
            return None;
        };
        let Some(lifecycle) = session.lifecycle.as_ref() else {
            debug!("Ignoring event on fallback form");
            return None;
        };
        if session.outcome.is_some() {
            debug!("Ignoring event on completed form");
            return None;
        }

        match event {
            SurveyEvent::ValueChanged(draft) => {
                lifecycle.schedule_autosave(draft);
                None
            }
            SurveyEvent::PartialSubmit(draft) => {
                lifecycle.persist(draft).await;
                None
            }
            SurveyEvent::Complete(draft) => {
                let outcome = lifecycle.complete(draft).await;
                session.outcome = Some(outcome.clone());
                self.show_outcome(&outcome);
                Some(outcome)
            }
        }
    }

    /// Drive the shell from route and event streams until the route stream
    /// closes, then tear down and hand the renderer back.
    ///
    /// Events already queued when the route stream closes are still handled,
    /// so a completion sent just before shutdown reaches the backend.
    pub async fn run(
        mut self,
        mut routes: mpsc::Receiver<String>,
        mut events: mpsc::Receiver<SurveyEvent>,
    ) -> R {
        let mut language = self.translations.subscribe();

        loop {
            tokio::select! {
                biased;

                route = routes.recv() => match route {
                    Some(path) => {
                        self.navigate(&path).await;
                        // Navigation already rendered in the resolved language
                        language.borrow_and_update();
                    }
                    None => {
                        while let Ok(event) = events.try_recv() {
                            self.handle_event(event).await;
                        }
                        break;
                    }
                },
                changed = language.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    language.borrow_and_update();
                    self.apply_language();
                }
                Some(event) = events.recv() => {
                    self.handle_event(event).await;
                }
            }
        }

        info!("Survey shell torn down");
        self.session = None;
        self.renderer
    }

    fn show_outcome(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Redirect(url) => {
                info!("Redirecting to {}", url);
                self.renderer.redirect(url);
            }
            Outcome::ThankYou => {
                let strings = self.translations.strings();
                self.renderer.show_thank_you(strings);
            }
        }
    }

    fn render(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        match &session.outcome {
            // The confirmation follows the language; a redirect has left the page
            Some(Outcome::ThankYou) => {
                let strings = self.translations.strings();
                self.renderer.show_thank_you(strings);
            }
            Some(Outcome::Redirect(_)) => {}
            None => {
                let view = self.build_view(&session.content);
                self.renderer.render(&view);
            }
        }
    }

    fn build_view(&self, content: &Content) -> SurveyView {
        let language = self.translations.current();
        let switch_language = language.strings().switch_language.to_string();

        match content {
            Content::Loaded(definition) => SurveyView {
                language,
                title: definition.title.clone(),
                document: definition.form_data.clone(),
                logo_url: definition
                    .logo_url
                    .clone()
                    .filter(|url| !url.is_empty())
                    .or_else(|| self.logo_path.clone()),
                header_color: definition
                    .background_color
                    .clone()
                    .filter(|color| !color.is_empty())
                    .unwrap_or_else(|| DEFAULT_HEADER_COLOR.to_string()),
                switch_language,
                is_fallback: false,
            },
            Content::NotFound => SurveyView {
                language,
                title: language.strings().form_not_found_title.to_string(),
                document: fallback_document(language),
                logo_url: self.logo_path.clone(),
                header_color: DEFAULT_HEADER_COLOR.to_string(),
                switch_language,
                is_fallback: true,
            },
        }
    }
}
