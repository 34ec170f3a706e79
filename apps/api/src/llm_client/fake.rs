//! In-memory `ModelProvider` for tests. Counts every call it receives.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmError, ModelInfo, ModelProvider};

pub struct FakeProvider {
    reply: Result<String, (u16, String)>,
    listing: Result<Vec<ModelInfo>, u16>,
    list_calls: AtomicUsize,
    generate_calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_model: Mutex<Option<String>>,
}

impl FakeProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            listing: Ok(Vec::new()),
            list_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_model: Mutex::new(None),
        }
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            reply: Err((status, body.to_string())),
            ..Self::replying("")
        }
    }

    pub fn with_models(mut self, models: Vec<ModelInfo>) -> Self {
        self.listing = Ok(models);
        self
    }

    pub fn with_listing_error(mut self, status: u16) -> Self {
        self.listing = Err(status);
        self
    }

    /// Total provider calls, listing and generation combined.
    pub fn network_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst) + self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }

    pub fn last_model(&self) -> Option<String> {
        self.last_model.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for FakeProvider {
    async fn list_models(&self, _api_key: &str) -> Result<Vec<ModelInfo>, LlmError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match &self.listing {
            Ok(models) => Ok(models.clone()),
            Err(status) => Err(LlmError::Api {
                status: *status,
                message: "API key not valid".to_string(),
            }),
        }
    }

    async fn generate_content(
        &self,
        _api_key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        *self.last_model.lock().unwrap() = Some(model.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err((status, body)) => Err(LlmError::Api {
                status: *status,
                message: body.clone(),
            }),
        }
    }
}
