use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use codepal_core::bus::PanelEvent;
use codepal_session::{Panel, TestKind};
use codepal_util::text::first_line;

use crate::render::with_printer;

const HELP: &str = "\
Commands:
  /apply N                 run action N from the last reply
  /actions                 list the actions of the last reply
  /context                 show the current editor context
  /tests [unit|functional] generate tests for the active file
  /upgrade                 propose an upgrade plan
  /new                     start a new conversation
  /help                    show this help
  /quit                    leave
Anything else is sent as a message.";

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Message(String),
    Apply(usize),
    Actions,
    Context,
    Tests(TestKind),
    Upgrade,
    New,
    Help,
    Quit,
    Invalid(String),
}

fn parse_line(line: &str) -> Option<ReplCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(ReplCommand::Message(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let arg = parts.next();
    let parsed = match command {
        "apply" => match arg.map(str::parse::<usize>) {
            Some(Ok(n)) => ReplCommand::Apply(n),
            _ => ReplCommand::Invalid("usage: /apply N".to_string()),
        },
        "actions" => ReplCommand::Actions,
        "context" => ReplCommand::Context,
        "tests" => match arg.unwrap_or("unit").parse::<TestKind>() {
            Ok(kind) => ReplCommand::Tests(kind),
            Err(message) => ReplCommand::Invalid(message),
        },
        "upgrade" => ReplCommand::Upgrade,
        "new" => ReplCommand::New,
        "help" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => ReplCommand::Invalid(format!("unknown command /{other}, try /help")),
    };
    Some(parsed)
}

pub(crate) async fn run_repl(
    panel: Arc<Panel>,
    events: &mut broadcast::Receiver<PanelEvent>,
) -> Result<()> {
    println!("codepal: type a message, or /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("› ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = parse_line(&line) else {
            continue;
        };
        tracing::debug!(panel = %panel.id(), input = first_line(&line), "repl input");

        match command {
            ReplCommand::Message(text) => {
                let _ = with_printer(events, panel.send_message(&text)).await;
            }
            ReplCommand::Apply(n) => {
                let _ = with_printer(events, panel.apply_action(n)).await;
            }
            ReplCommand::Actions => {
                let actions = panel.last_actions();
                if actions.is_empty() {
                    println!("No actions in the last reply.");
                }
                for (i, action) in actions.iter().enumerate() {
                    println!("  [{}] {}", i + 1, action.label());
                }
            }
            ReplCommand::Context => {
                with_printer(events, panel.send_editor_content()).await;
            }
            ReplCommand::Tests(kind) => {
                let _ = with_printer(events, panel.generate_tests(kind)).await;
            }
            ReplCommand::Upgrade => {
                let _ = with_printer(events, panel.upgrade_project()).await;
            }
            ReplCommand::New => {
                with_printer(events, async { panel.new_conversation() }).await;
            }
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Quit => break,
            ReplCommand::Invalid(message) => eprintln!("{}", message),
        }
    }
    Ok(())
}
