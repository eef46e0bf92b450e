use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

mod cli;
mod host;
mod info;
mod render;
mod repl;

use cli::*;
use codepal_config::FileConfigSource;
use codepal_core::UiBus;
use codepal_provider::AnthropicFactory;
use codepal_session::Controller;
use codepal_util::text::first_line;
use codepal_util::{init_tracing, LogLevel};
use host::{build_host, workspace_root};
use info::{list_models, show_config};
use render::with_printer;
use repl::run_repl;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let root = workspace_root(&cli)?;

    let config_source = Arc::new(FileConfigSource::new(Some(root.clone())));
    let config = config_source.load();
    let level = cli
        .log_level
        .as_deref()
        .or(config.log_level.as_deref())
        .map(LogLevel::parse);
    let _log_guard = init_tracing(level, cli.log_dir.as_deref());
    tracing::debug!(workspace = %root.display(), "starting");

    match cli.command {
        Commands::Models => {
            list_models();
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Config => {
            show_config(&root)?;
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let (_editor, services) = build_host(&cli, &root).await?;
    let bus = Arc::new(UiBus::new());
    let mut events = bus.subscribe();
    let controller = Controller::new(
        services,
        config_source,
        Arc::new(AnthropicFactory),
        bus.clone(),
    );
    let panel = controller.open_panel().await;

    let succeeded = match cli.command {
        Commands::Chat { message } => {
            let text = message.join(" ");
            tracing::info!(panel = %panel.id(), text = first_line(&text), "chat");
            with_printer(&mut events, panel.send_message(&text)).await.is_ok()
        }
        Commands::Tests { kind } => with_printer(&mut events, panel.generate_tests(kind.into()))
            .await
            .is_ok(),
        Commands::Upgrade => with_printer(&mut events, panel.upgrade_project())
            .await
            .is_ok(),
        Commands::Context { json } => {
            if json {
                let snapshot = panel.session().snapshots().build().await;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                with_printer(&mut events, panel.send_editor_content()).await;
            }
            true
        }
        Commands::Repl => {
            run_repl(panel.clone(), &mut events).await?;
            true
        }
        Commands::Models | Commands::Config => true,
    };

    controller.close(panel.id()).await;
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
