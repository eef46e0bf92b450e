use tokio::sync::broadcast::{self, error::TryRecvError};

use codepal_action::locate_actions;
use codepal_core::bus::PanelEvent;
use codepal_types::{ContextSnapshot, UiEvent};
use codepal_util::text::truncate_chars;

/// Replaces action markers with numbered references usable with `/apply N`.
///
/// Numbers follow the same marker order `apply_action` resolves against.
pub(crate) fn for_terminal(annotated: &str) -> String {
    let mut out = String::with_capacity(annotated.len());
    let mut last = 0;
    for (idx, located) in locate_actions(annotated).into_iter().enumerate() {
        out.push_str(annotated[last..located.span.start].trim_end_matches('\n'));
        out.push_str(&format!("\n  [{}] {}\n\n", idx + 1, located.action.label()));
        let rest = &annotated[located.span.end..];
        last = located.span.end + (rest.len() - rest.trim_start_matches('\n').len());
    }
    out.push_str(&annotated[last..]);
    out.trim_end().to_string()
}

pub(crate) fn describe_snapshot(snapshot: &ContextSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("File:       {}\n", snapshot.display_file_name()));
    out.push_str(&format!("Language:   {}\n", snapshot.language_id));
    out.push_str(&format!("Lines:      {}\n", snapshot.full_text.lines().count()));
    if snapshot.has_selection() {
        out.push_str(&format!(
            "Selection:  {}\n",
            truncate_chars(&snapshot.selected_text.replace('\n', "⏎"), 50)
        ));
    }
    if let Some(name) = &snapshot.dependency_manifest_name {
        out.push_str(&format!(
            "Manifest:   {} ({} bytes)\n",
            name,
            snapshot.dependency_manifest_text.len()
        ));
    }
    if !snapshot.project_summary.is_empty() {
        out.push('\n');
        out.push_str(&snapshot.project_summary);
        out.push('\n');
    }
    out
}

pub(crate) fn print_event(event: &UiEvent) {
    match event {
        UiEvent::Loading(true) => eprintln!("… waiting for the model"),
        UiEvent::Loading(false) => {}
        UiEvent::Response(annotated) => println!("\n{}\n", for_terminal(annotated)),
        UiEvent::Error(message) => eprintln!("error: {}", message),
        UiEvent::Info(message) => println!("✓ {}", message),
        UiEvent::UserMessage(text) => println!("> {}", text),
        UiEvent::EditorContent(snapshot) => print!("{}", describe_snapshot(snapshot)),
    }
}

/// Prints everything already published on the bus.
pub(crate) fn drain(rx: &mut broadcast::Receiver<PanelEvent>) {
    loop {
        match rx.try_recv() {
            Ok(published) => print_event(&published.event),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "terminal fell behind the event bus");
            }
            Err(_) => break,
        }
    }
}

/// Runs `op` while printing bus events as they arrive.
pub(crate) async fn with_printer<F: std::future::Future>(
    rx: &mut broadcast::Receiver<PanelEvent>,
    op: F,
) -> F::Output {
    tokio::pin!(op);
    loop {
        tokio::select! {
            output = &mut op => {
                drain(rx);
                return output;
            }
            received = rx.recv() => match received {
                Ok(published) => print_event(&published.event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "terminal fell behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
    op.await
}
