use std::sync::Arc;

use codepal_action::{ActionError, ActionExecutor};
use codepal_config::ConfigSource;
use codepal_core::{PanelId, UiSink};
use codepal_provider::ProviderFactory;
use codepal_types::{ContextSnapshot, PendingAction, UiCommand, UiEvent};
use parking_lot::Mutex;

use crate::session::{ConversationSession, RenderedReply, SessionError};
use crate::snapshot::SnapshotBuilder;
use crate::template::{render, PromptTemplate};
use crate::HostServices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    Unit,
    Functional,
}

impl TestKind {
    pub fn template(&self) -> PromptTemplate {
        match self {
            TestKind::Unit => PromptTemplate::UnitTest,
            TestKind::Functional => PromptTemplate::FunctionalTest,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TestKind::Unit => "Generate unit tests for the current file.",
            TestKind::Functional => "Generate functional tests for the current file.",
        }
    }
}

impl std::str::FromStr for TestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unit" => Ok(TestKind::Unit),
            "functional" | "integration" => Ok(TestKind::Functional),
            other => Err(format!("unknown test kind: {other} (expected unit or functional)")),
        }
    }
}

const UPGRADE_LABEL: &str = "Analyze the project for an upgrade and propose improvements.";

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("No file open to generate tests for.")]
    NoFileOpen,

    #[error("No dependency file found (package.json, pom.xml, etc.). Cannot analyze the project for an upgrade.")]
    NoDependencyManifest,

    #[error("No action #{0} in the last reply.")]
    NoSuchAction(usize),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Action(#[from] ActionError),
}

/// A chat panel: one conversation bound to the host and a UI channel.
///
/// Every flow reports its outcome on the sink. The returned `Result` mirrors
/// what was emitted.
pub struct Panel {
    id: PanelId,
    session: ConversationSession,
    executor: ActionExecutor,
    sink: Arc<dyn UiSink>,
    last_actions: Mutex<Vec<PendingAction>>,
}

impl Panel {
    pub fn new(
        id: PanelId,
        host: HostServices,
        config: Arc<dyn ConfigSource>,
        providers: Arc<dyn ProviderFactory>,
        sink: Arc<dyn UiSink>,
    ) -> Self {
        let executor = ActionExecutor::new(
            host.editor.clone(),
            host.workspace.clone(),
            host.fs.clone(),
        );
        let session =
            ConversationSession::new(config, providers, SnapshotBuilder::new(host), sink.clone());
        Self {
            id,
            session,
            executor,
            sink,
            last_actions: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &PanelId {
        &self.id
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    /// Actions offered by the most recent successful reply.
    pub fn last_actions(&self) -> Vec<PendingAction> {
        self.last_actions.lock().clone()
    }

    /// Dispatches a command coming from the UI. Failures are already on the sink.
    pub async fn handle(&self, command: UiCommand) {
        tracing::debug!(panel = %self.id, ?command, "handling ui command");
        let result = match command {
            UiCommand::SendMessage { text } => self.send_message(&text).await.map(|_| ()),
            UiCommand::GetEditorContent => {
                self.send_editor_content().await;
                Ok(())
            }
            UiCommand::InsertCodeIntoEditor { code } => {
                self.run_action(&PendingAction::InsertCode { code }).await
            }
            UiCommand::CreateFile { path, content } => {
                self.run_action(&PendingAction::CreateFile { path, content })
                    .await
            }
        };
        if let Err(error) = result {
            tracing::debug!(panel = %self.id, %error, "command failed");
        }
    }

    pub async fn send_message(&self, text: &str) -> Result<RenderedReply, PanelError> {
        let outcome = self.session.send_user_message(text).await;
        self.publish_reply(outcome)
    }

    pub async fn send_editor_content(&self) -> ContextSnapshot {
        let snapshot = self.session.snapshots().build().await;
        self.sink.emit(UiEvent::EditorContent(snapshot.clone()));
        snapshot
    }

    pub async fn generate_tests(&self, kind: TestKind) -> Result<RenderedReply, PanelError> {
        let snapshot = self.session.snapshots().build().await;
        if !snapshot.has_file() {
            return Err(self.fail(PanelError::NoFileOpen));
        }

        let template = kind.template();
        let prompt = render(template, &snapshot, None);
        tracing::info!(
            panel = %self.id,
            template = template.name(),
            file = snapshot.display_file_name(),
            "generating tests"
        );
        self.sink.emit(UiEvent::UserMessage(kind.label().to_string()));

        let outcome = self.session.send_templated_message(&prompt).await;
        self.publish_reply(outcome)
    }

    pub async fn upgrade_project(&self) -> Result<RenderedReply, PanelError> {
        let snapshot = self.session.snapshots().build().await;
        if !snapshot.has_dependencies() {
            return Err(self.fail(PanelError::NoDependencyManifest));
        }

        let prompt = render(PromptTemplate::UpgradeProject, &snapshot, None);
        tracing::info!(
            panel = %self.id,
            template = PromptTemplate::UpgradeProject.name(),
            manifest = ?snapshot.dependency_manifest_name,
            "analyzing project upgrade"
        );
        self.sink.emit(UiEvent::UserMessage(UPGRADE_LABEL.to_string()));

        let outcome = self.session.send_templated_message(&prompt).await;
        self.publish_reply(outcome)
    }

    pub fn new_conversation(&self) {
        self.session.clear_history();
        self.last_actions.lock().clear();
        self.sink
            .emit(UiEvent::Info("Started a new conversation.".to_string()));
    }

    /// Runs pending action `number` (1-based) from the last reply.
    pub async fn apply_action(&self, number: usize) -> Result<(), PanelError> {
        let action = number
            .checked_sub(1)
            .and_then(|idx| self.last_actions.lock().get(idx).cloned());
        match action {
            Some(action) => self.run_action(&action).await,
            None => Err(self.fail(PanelError::NoSuchAction(number))),
        }
    }

    async fn run_action(&self, action: &PendingAction) -> Result<(), PanelError> {
        match self.executor.execute(action).await {
            Ok(message) => {
                self.sink.emit(UiEvent::Info(message));
                Ok(())
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }

    fn publish_reply(
        &self,
        outcome: Result<RenderedReply, SessionError>,
    ) -> Result<RenderedReply, PanelError> {
        match outcome {
            Ok(reply) => {
                *self.last_actions.lock() = reply.actions.clone();
                self.sink.emit(UiEvent::Response(reply.annotated.clone()));
                Ok(reply)
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }

    fn fail(&self, error: PanelError) -> PanelError {
        tracing::warn!(panel = %self.id, %error, "panel operation failed");
        self.sink.emit(UiEvent::Error(error.to_string()));
        error
    }
}
