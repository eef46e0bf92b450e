use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use codepal_action::{DirectiveParser, MarkupDirectiveParser};
use codepal_config::{AssistantSettings, ConfigSource};
use codepal_core::id::{self, Prefix};
use codepal_core::UiSink;
use codepal_provider::{ChatRequest, Message, ProviderError, ProviderFactory};
use codepal_types::{ChatMessage, ChatRole, PendingAction, UiEvent};
use parking_lot::Mutex;

use crate::snapshot::SnapshotBuilder;
use crate::system::SystemPrompt;
use crate::template::compose_chat_prompt;

/// Number of stored messages sent along with each new prompt.
pub const HISTORY_WINDOW: usize = 10;

const MISSING_API_KEY: &str =
    "API key missing. Set apiKey in codepal.json or the ANTHROPIC_API_KEY environment variable.";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Configuration(String),

    #[error("Error: {0}")]
    Provider(#[from] ProviderError),
}

/// A model reply, as received and with action markers added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReply {
    pub raw: String,
    pub annotated: String,
    pub actions: Vec<PendingAction>,
}

/// One conversation: its history, its loading state and the collaborators
/// each request is built from.
///
/// Calls are not serialized. Each one captures the history window when it
/// starts and records its exchange when it completes, so concurrent calls
/// land in completion order.
pub struct ConversationSession {
    config: Arc<dyn ConfigSource>,
    providers: Arc<dyn ProviderFactory>,
    snapshots: SnapshotBuilder,
    parser: Arc<dyn DirectiveParser>,
    sink: Arc<dyn UiSink>,
    history: Mutex<Vec<ChatMessage>>,
    in_flight: AtomicUsize,
}

impl ConversationSession {
    pub fn new(
        config: Arc<dyn ConfigSource>,
        providers: Arc<dyn ProviderFactory>,
        snapshots: SnapshotBuilder,
        sink: Arc<dyn UiSink>,
    ) -> Self {
        Self {
            config,
            providers,
            snapshots,
            parser: Arc::new(MarkupDirectiveParser),
            sink,
            history: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn DirectiveParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Sends `text` wrapped in the chat prompt built from a fresh snapshot.
    pub async fn send_user_message(&self, text: &str) -> Result<RenderedReply, SessionError> {
        let _loading = LoadingGuard::begin(self);
        let (settings, api_key) = self.settings()?;

        let snapshot = self.snapshots.build().await;
        let prompt = compose_chat_prompt(&snapshot, text);
        self.round_trip(&settings, &api_key, text, prompt).await
    }

    /// Sends an already rendered prompt. The history records an empty user turn.
    pub async fn send_templated_message(
        &self,
        rendered_prompt: &str,
    ) -> Result<RenderedReply, SessionError> {
        let _loading = LoadingGuard::begin(self);
        let (settings, api_key) = self.settings()?;
        self.round_trip(&settings, &api_key, "", rendered_prompt.to_string())
            .await
    }

    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().clone()
    }

    /// The stored messages the next request would carry.
    pub fn transmission_window(&self) -> Vec<ChatMessage> {
        let history = self.history.lock();
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        history[start..].to_vec()
    }

    pub fn clear_history(&self) {
        let mut history = self.history.lock();
        tracing::info!(dropped = history.len(), "cleared conversation history");
        history.clear();
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn snapshots(&self) -> &SnapshotBuilder {
        &self.snapshots
    }

    fn settings(&self) -> Result<(AssistantSettings, String), SessionError> {
        let settings = self.config.settings();
        match settings.api_key.clone() {
            Some(key) => Ok((settings, key)),
            None => {
                tracing::warn!("no API key configured");
                Err(SessionError::Configuration(MISSING_API_KEY.to_string()))
            }
        }
    }

    async fn round_trip(
        &self,
        settings: &AssistantSettings,
        api_key: &str,
        user_text: &str,
        prompt: String,
    ) -> Result<RenderedReply, SessionError> {
        let request_id = id::create(Prefix::Request, None);

        let mut messages: Vec<Message> = self
            .transmission_window()
            .into_iter()
            .map(|m| match m.role {
                ChatRole::User => Message::user(m.content),
                ChatRole::Assistant => Message::assistant(m.content),
            })
            .collect();
        let window = messages.len();
        messages.push(Message::user(prompt));

        let request = ChatRequest::new(settings.model.clone(), messages)
            .with_max_tokens(settings.max_tokens)
            .with_system(SystemPrompt::persona());

        tracing::info!(
            request = %request_id,
            model = %settings.model,
            max_tokens = settings.max_tokens,
            window,
            "sending chat request"
        );

        let provider = self
            .providers
            .create(api_key, settings.base_url.as_deref());
        let response = provider.chat(request).await.map_err(|error| {
            tracing::warn!(request = %request_id, %error, "chat request failed");
            SessionError::Provider(error)
        })?;

        self.record_exchange(user_text, &response.text);

        let annotated = self.parser.annotate(&response.text);
        let actions = self.parser.extract_actions(&annotated);
        tracing::info!(
            request = %request_id,
            reply_bytes = response.text.len(),
            actions = actions.len(),
            "received chat reply"
        );

        Ok(RenderedReply {
            raw: response.text,
            annotated,
            actions,
        })
    }

    /// The only place history grows: a user turn and its reply, together.
    fn record_exchange(&self, user_text: &str, reply: &str) {
        let mut history = self.history.lock();
        history.push(ChatMessage::user(user_text));
        history.push(ChatMessage::assistant(reply));
    }
}

/// Holds the loading state on for as long as a request is being handled.
struct LoadingGuard<'a> {
    session: &'a ConversationSession,
}

impl<'a> LoadingGuard<'a> {
    fn begin(session: &'a ConversationSession) -> Self {
        session.in_flight.fetch_add(1, Ordering::SeqCst);
        session.sink.emit(UiEvent::Loading(true));
        Self { session }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.session.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.session.sink.emit(UiEvent::Loading(false));
    }
}
