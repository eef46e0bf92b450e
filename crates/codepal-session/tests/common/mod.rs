#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use codepal_config::AssistantSettings;
use codepal_core::{PanelId, RecordingSink};
use codepal_provider::{ChatRequest, ChatResponse, ModelInfo, Provider, ProviderError, ProviderFactory};
use codepal_session::{ConversationSession, HostServices, Panel, SnapshotBuilder};
use codepal_workspace::{BufferEditor, LocalWorkspace};
use parking_lot::Mutex;
use tokio::sync::Notify;

/// Replies from a script, recording every request it receives.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, text: &str) {
        self.replies.lock().push_back(Ok(text.to_string()));
    }

    pub fn fail(&self, message: &str) {
        self.replies.lock().push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    fn name(&self) -> &str {
        "Scripted"
    }

    fn models(&self) -> Vec<ModelInfo> {
        Vec::new()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        self.requests.lock().push(request);
        let next = self.replies.lock().pop_front();
        match next {
            Some(Ok(text)) => Ok(response(text)),
            Some(Err(message)) => Err(ProviderError::ApiError(message)),
            None => Ok(response("ok".to_string())),
        }
    }
}

/// Holds each request until the test releases the gate named in its prompt.
#[derive(Default)]
pub struct GatedProvider {
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    received: Mutex<Vec<String>>,
}

impl GatedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn gate(&self, key: &str) -> Arc<Notify> {
        self.gates
            .lock()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    pub fn release(&self, key: &str) {
        self.gate(key).notify_one();
    }

    pub fn received(&self) -> usize {
        self.received.lock().len()
    }
}

#[async_trait]
impl Provider for GatedProvider {
    fn id(&self) -> &str {
        "gated"
    }

    fn name(&self) -> &str {
        "Gated"
    }

    fn models(&self) -> Vec<ModelInfo> {
        Vec::new()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let prompt = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.received.lock().push(prompt.clone());
        self.gate(&prompt).notified().await;
        Ok(response(format!("reply to {}", prompt)))
    }
}

pub fn response(text: String) -> ChatResponse {
    ChatResponse {
        id: "msg_test".to_string(),
        model: "test-model".to_string(),
        text,
        usage: None,
    }
}

/// A factory handing out `provider` and recording the keys it was asked for.
pub fn factory(provider: Arc<dyn Provider>, keys: Arc<Mutex<Vec<String>>>) -> Arc<dyn ProviderFactory> {
    Arc::new(move |api_key: &str, _base_url: Option<&str>| -> Arc<dyn Provider> {
        keys.lock().push(api_key.to_string());
        provider.clone()
    })
}

pub fn settings(api_key: Option<&str>) -> AssistantSettings {
    AssistantSettings {
        api_key: api_key.map(str::to_string),
        ..AssistantSettings::default()
    }
}

pub fn host(editor: Arc<BufferEditor>, root: Option<&Path>) -> HostServices {
    let workspace = match root {
        Some(root) => LocalWorkspace::new(root),
        None => LocalWorkspace::none(),
    };
    HostServices::local(editor, workspace)
}

pub fn session(
    provider: Arc<dyn Provider>,
    settings: AssistantSettings,
    host: HostServices,
    sink: Arc<RecordingSink>,
) -> ConversationSession {
    ConversationSession::new(
        Arc::new(settings),
        factory(provider, Arc::new(Mutex::new(Vec::new()))),
        SnapshotBuilder::new(host),
        sink,
    )
}

pub fn panel(
    provider: Arc<dyn Provider>,
    settings: AssistantSettings,
    host: HostServices,
    sink: Arc<RecordingSink>,
) -> Panel {
    Panel::new(
        PanelId::new(),
        host,
        Arc::new(settings),
        factory(provider, Arc::new(Mutex::new(Vec::new()))),
        sink,
    )
}
