mod common;

use std::fs;
use std::sync::Arc;

use codepal_action::DirectiveParser;
use codepal_config::{AssistantSettings, ConfigSource, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use codepal_core::RecordingSink;
use codepal_provider::Role;
use codepal_session::{ConversationSession, SessionError, SnapshotBuilder, SystemPrompt, HISTORY_WINDOW};
use codepal_types::{ChatMessage, ChatRole, PendingAction, UiEvent};
use codepal_workspace::BufferEditor;
use common::{factory, host, session, settings, GatedProvider, ScriptedProvider};
use parking_lot::Mutex;

fn no_editor() -> Arc<BufferEditor> {
    Arc::new(BufferEditor::empty())
}

#[tokio::test]
async fn test_window_is_last_ten_in_order() {
    let provider = ScriptedProvider::new();
    let sink = Arc::new(RecordingSink::new());
    let session = session(provider.clone(), settings(Some("key")), host(no_editor(), None), sink);

    for i in 0..7 {
        provider.reply(&format!("r{i}"));
        session.send_templated_message(&format!("p{i}")).await.unwrap();
    }
    assert_eq!(session.history().len(), 14);

    let window = session.transmission_window();
    assert_eq!(window.len(), HISTORY_WINDOW);
    assert_eq!(window, session.history()[4..].to_vec());

    session.send_templated_message("p7").await.unwrap();
    let requests = provider.requests();
    let last = requests.last().unwrap();
    assert_eq!(last.messages.len(), HISTORY_WINDOW + 1);
    let sent: Vec<&str> = last.messages[..HISTORY_WINDOW]
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(sent, vec!["", "r2", "", "r3", "", "r4", "", "r5", "", "r6"]);
    assert_eq!(last.messages[HISTORY_WINDOW].content, "p7");
    assert_eq!(last.messages[HISTORY_WINDOW].role, Role::User);

    // Storage keeps everything.
    assert_eq!(session.history().len(), 16);
}

#[tokio::test]
async fn test_missing_api_key_is_configuration_error() {
    let provider = ScriptedProvider::new();
    let sink = Arc::new(RecordingSink::new());
    let session = session(provider.clone(), settings(None), host(no_editor(), None), sink.clone());

    let err = session.send_user_message("hello").await.unwrap_err();

    assert!(matches!(err, SessionError::Configuration(_)));
    assert!(session.history().is_empty());
    assert!(provider.requests().is_empty());
    assert!(!session.is_loading());
    assert_eq!(sink.events(), vec![UiEvent::Loading(true), UiEvent::Loading(false)]);
}

#[tokio::test]
async fn test_provider_error_leaves_history_unchanged() {
    let provider = ScriptedProvider::new();
    let sink = Arc::new(RecordingSink::new());
    let session = session(provider.clone(), settings(Some("key")), host(no_editor(), None), sink.clone());

    provider.reply("first answer");
    session.send_templated_message("one").await.unwrap();
    let before = session.history();

    provider.fail("overloaded");
    let err = session.send_templated_message("two").await.unwrap_err();
    assert!(matches!(err, SessionError::Provider(_)));
    assert!(err.to_string().contains("overloaded"));
    assert_eq!(session.history(), before);
    assert_eq!(sink.events().last(), Some(&UiEvent::Loading(false)));

    // Still usable afterwards.
    provider.reply("third answer");
    session.send_templated_message("three").await.unwrap();
    assert_eq!(session.history().len(), 4);
    assert_eq!(session.history()[3], ChatMessage::assistant("third answer"));
}

#[tokio::test]
async fn test_user_message_records_original_text() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, "a\nb").unwrap();
    let editor = Arc::new(BufferEditor::open(&file).await.unwrap());

    let provider = ScriptedProvider::new();
    provider.reply("It is a list.");
    let sink = Arc::new(RecordingSink::new());
    let session = session(provider.clone(), settings(Some("key")), host(editor, None), sink);

    let reply = session.send_user_message("what is this?").await.unwrap();
    assert_eq!(reply.raw, "It is a list.");

    assert_eq!(
        session.history(),
        vec![
            ChatMessage::user("what is this?"),
            ChatMessage::assistant("It is a list."),
        ]
    );

    let request = &provider.requests()[0];
    assert_eq!(request.model, DEFAULT_MODEL);
    assert_eq!(request.max_tokens, Some(DEFAULT_MAX_TOKENS));
    assert_eq!(request.system.as_deref(), Some(SystemPrompt::persona()));
    let prompt = &request.messages[0].content;
    assert!(prompt.contains("```plaintext\na\nb\n```"));
    assert!(prompt.contains("what is this?"));
    assert!(!prompt.contains("Sélection actuelle"));
}

#[tokio::test]
async fn test_selection_is_included_in_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("calc.py");
    fs::write(&file, "x = 1\ny = 2\n").unwrap();
    let editor = Arc::new(BufferEditor::open(&file).await.unwrap());
    editor.select_lines(2, 2);

    let provider = ScriptedProvider::new();
    let session = session(
        provider.clone(),
        settings(Some("key")),
        host(editor, None),
        Arc::new(RecordingSink::new()),
    );
    session.send_user_message("rename y").await.unwrap();

    let prompt = &provider.requests()[0].messages[0].content;
    assert!(prompt.contains("Sélection actuelle:\n```python\ny = 2\n\n```"));
}

#[tokio::test]
async fn test_templated_message_records_empty_user_turn() {
    let provider = ScriptedProvider::new();
    provider.reply("tests here");
    let session = session(
        provider.clone(),
        settings(Some("key")),
        host(no_editor(), None),
        Arc::new(RecordingSink::new()),
    );

    session.send_templated_message("RENDERED").await.unwrap();

    assert_eq!(provider.requests()[0].messages[0].content, "RENDERED");
    let history = session.history();
    assert_eq!(history[0].role, ChatRole::User);
    assert_eq!(history[0].content, "");
}

#[tokio::test]
async fn test_reply_is_annotated() {
    let provider = ScriptedProvider::new();
    provider.reply("Use:\n```rust\nfn a() {}\n```\nand <create-file path=\"b.rs\">fn b() {}</create-file>");
    let session = session(
        provider.clone(),
        settings(Some("key")),
        host(no_editor(), None),
        Arc::new(RecordingSink::new()),
    );

    let reply = session.send_templated_message("go").await.unwrap();

    assert!(reply.annotated.contains("data-action=\"insertCode\""));
    assert!(reply.annotated.contains("data-action=\"createFile\""));
    assert_eq!(reply.actions.len(), 2);
    // History keeps the raw reply.
    assert_eq!(session.history()[1].content, reply.raw);
}

/// Treats every reply line starting with `>> ` as a file to create.
struct LineParser;

impl DirectiveParser for LineParser {
    fn annotate(&self, raw: &str) -> String {
        raw.replace(">> ", "[file] ")
    }

    fn extract_actions(&self, annotated: &str) -> Vec<PendingAction> {
        annotated
            .lines()
            .filter_map(|line| line.strip_prefix("[file] "))
            .map(|path| PendingAction::CreateFile {
                path: path.to_string(),
                content: String::new(),
            })
            .collect()
    }
}

#[tokio::test]
async fn test_custom_directive_parser() {
    let provider = ScriptedProvider::new();
    provider.reply("Two files:\n>> a.txt\n```\nignored by this parser\n```\n>> b.txt");
    let session = session(
        provider.clone(),
        settings(Some("key")),
        host(no_editor(), None),
        Arc::new(RecordingSink::new()),
    )
    .with_parser(Arc::new(LineParser));

    let reply = session.send_templated_message("go").await.unwrap();

    assert!(!reply.annotated.contains("action-button"));
    assert!(reply.annotated.contains("[file] a.txt"));
    assert_eq!(
        reply.actions,
        vec![
            PendingAction::CreateFile {
                path: "a.txt".to_string(),
                content: String::new(),
            },
            PendingAction::CreateFile {
                path: "b.txt".to_string(),
                content: String::new(),
            },
        ]
    );
    assert_eq!(session.history()[1].content, reply.raw);
}

#[tokio::test]
async fn test_concurrent_calls_append_in_completion_order() {
    let provider = GatedProvider::new();
    let session = Arc::new(session(
        provider.clone(),
        settings(Some("key")),
        host(no_editor(), None),
        Arc::new(RecordingSink::new()),
    ));

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.send_templated_message("first").await }
    });
    let second = tokio::spawn({
        let session = session.clone();
        async move { session.send_templated_message("second").await }
    });

    while provider.received() < 2 {
        tokio::task::yield_now().await;
    }
    assert!(session.is_loading());

    provider.release("second");
    second.await.unwrap().unwrap();
    assert!(session.is_loading());

    provider.release("first");
    first.await.unwrap().unwrap();
    assert!(!session.is_loading());

    let replies: Vec<String> = session
        .history()
        .into_iter()
        .filter(|m| m.role == ChatRole::Assistant)
        .map(|m| m.content)
        .collect();
    assert_eq!(replies, vec!["reply to second", "reply to first"]);
}

struct SwitchableConfig(Mutex<AssistantSettings>);

impl ConfigSource for SwitchableConfig {
    fn settings(&self) -> AssistantSettings {
        self.0.lock().clone()
    }
}

#[tokio::test]
async fn test_settings_are_read_on_every_call() {
    let provider = ScriptedProvider::new();
    let keys = Arc::new(Mutex::new(Vec::new()));
    let config = Arc::new(SwitchableConfig(Mutex::new(settings(Some("key-1")))));
    let session = ConversationSession::new(
        config.clone(),
        factory(provider.clone(), keys.clone()),
        SnapshotBuilder::new(host(no_editor(), None)),
        Arc::new(RecordingSink::new()),
    );

    session.send_templated_message("a").await.unwrap();
    {
        let mut current = config.0.lock();
        current.api_key = Some("key-2".to_string());
        current.model = "claude-3-haiku-20240307".to_string();
        current.max_tokens = 1024;
    }
    session.send_templated_message("b").await.unwrap();

    assert_eq!(*keys.lock(), vec!["key-1".to_string(), "key-2".to_string()]);
    let requests = provider.requests();
    assert_eq!(requests[1].model, "claude-3-haiku-20240307");
    assert_eq!(requests[1].max_tokens, Some(1024));
}

#[tokio::test]
async fn test_clear_history() {
    let provider = ScriptedProvider::new();
    let session = session(
        provider.clone(),
        settings(Some("key")),
        host(no_editor(), None),
        Arc::new(RecordingSink::new()),
    );
    session.send_templated_message("a").await.unwrap();
    session.clear_history();
    assert!(session.history().is_empty());

    session.send_templated_message("b").await.unwrap();
    assert_eq!(provider.requests()[1].messages.len(), 1);
}
