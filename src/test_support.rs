//! In-memory `FormTransport` that records every call, for unit tests.

use crate::api::{Draft, FormDefinition, FormTransport, SubmissionResponse, TransportError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Fetch(String),
    Create {
        form_key: String,
        draft: Draft,
    },
    Update {
        form_key: String,
        record_id: String,
        draft: Draft,
        completed: bool,
    },
}

pub(crate) struct FakeTransport {
    pub calls: Mutex<Vec<Call>>,
    pub definition: Mutex<Option<FormDefinition>>,
    pub create_id: Mutex<Option<String>>,
    pub create_redirect: Mutex<Option<String>>,
    pub update_redirect: Mutex<Option<String>>,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
    pub latency: Mutex<Duration>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            definition: Mutex::new(Some(sample_definition())),
            create_id: Mutex::new(Some("rec-1".to_string())),
            create_redirect: Mutex::new(None),
            update_redirect: Mutex::new(None),
            fail_create: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            latency: Mutex::new(Duration::ZERO),
        }
    }
}

impl FakeTransport {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<Draft> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create { draft, .. } => Some(draft),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(String, Draft, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update {
                    record_id,
                    draft,
                    completed,
                    ..
                } => Some((record_id, draft, completed)),
                _ => None,
            })
            .collect()
    }

    pub fn fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Fetch(_)))
            .count()
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

fn unavailable() -> TransportError {
    TransportError::Status {
        status: 503,
        body: "unavailable".to_string(),
    }
}

#[async_trait]
impl FormTransport for FakeTransport {
    async fn fetch_definition(&self, form_key: &str) -> Result<FormDefinition, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Fetch(form_key.to_string()));
        self.simulate_latency().await;

        self.definition
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| TransportError::NotFound(form_key.to_string()))
    }

    async fn create_response(
        &self,
        form_key: &str,
        draft: &Draft,
    ) -> Result<SubmissionResponse, TransportError> {
        self.calls.lock().unwrap().push(Call::Create {
            form_key: form_key.to_string(),
            draft: draft.clone(),
        });
        let failed = self.fail_create.load(Ordering::SeqCst);
        let response = SubmissionResponse {
            success: true,
            id: self.create_id.lock().unwrap().clone(),
            redirect_url: self.create_redirect.lock().unwrap().clone(),
            message: None,
        };
        self.simulate_latency().await;

        if failed {
            return Err(unavailable());
        }
        Ok(response)
    }

    async fn update_response(
        &self,
        form_key: &str,
        record_id: &str,
        draft: &Draft,
        completed: bool,
    ) -> Result<SubmissionResponse, TransportError> {
        self.calls.lock().unwrap().push(Call::Update {
            form_key: form_key.to_string(),
            record_id: record_id.to_string(),
            draft: draft.clone(),
            completed,
        });
        let failed = self.fail_update.load(Ordering::SeqCst);
        let response = SubmissionResponse {
            success: true,
            id: Some(record_id.to_string()),
            redirect_url: self.update_redirect.lock().unwrap().clone(),
            message: None,
        };
        self.simulate_latency().await;

        if failed {
            return Err(unavailable());
        }
        Ok(response)
    }
}

pub(crate) fn sample_definition() -> FormDefinition {
    serde_json::from_value(json!({
        "id": "f-1",
        "title": "Customer feedback",
        "form_data": {
            "title": "Customer feedback",
            "pages": [{"name": "p1", "elements": [{"type": "text", "name": "q1"}]}]
        },
        "logo_url": "https://cdn.example.com/logo.png"
    }))
    .expect("valid definition")
}

/// One-answer draft.
pub(crate) fn draft(key: &str, value: Value) -> Draft {
    let mut draft = Draft::new();
    draft.insert(key.to_string(), value);
    draft
}
