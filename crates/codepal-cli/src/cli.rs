use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use codepal_session::TestKind;

#[derive(Parser)]
#[command(name = "codepal")]
#[command(about = "Codepal - a coding assistant for the file you are working on", long_about = None)]
pub(crate) struct Cli {
    /// File to open as the active document.
    #[arg(short = 'f', long, global = true)]
    pub(crate) file: Option<PathBuf>,
    /// Lines to select in the active document, 1-based and inclusive.
    #[arg(long, value_name = "START:END", global = true)]
    pub(crate) select: Option<String>,
    /// Line to place the cursor on when nothing is selected.
    #[arg(long, value_name = "LINE", global = true)]
    pub(crate) cursor: Option<usize>,
    /// Workspace root. Defaults to the current directory.
    #[arg(short = 'w', long, global = true)]
    pub(crate) workspace: Option<PathBuf>,
    /// Write logs to a timestamped file in this directory instead of stderr.
    #[arg(long = "log-dir", global = true)]
    pub(crate) log_dir: Option<PathBuf>,
    #[arg(long = "log-level", global = true)]
    pub(crate) log_level: Option<String>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    #[command(about = "Ask a question about the active file")]
    Chat {
        #[arg(value_name = "MESSAGE", trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },
    #[command(about = "Generate tests for the active file")]
    Tests {
        #[arg(value_enum, default_value = "unit")]
        kind: TestKindArg,
    },
    #[command(about = "Propose an upgrade plan from the dependency manifest")]
    Upgrade,
    #[command(about = "Show the context that would be sent with a message")]
    Context {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    #[command(about = "Start an interactive conversation")]
    Repl,
    #[command(about = "List known models")]
    Models,
    #[command(about = "Show the resolved configuration")]
    Config,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum TestKindArg {
    Unit,
    Functional,
}

impl From<TestKindArg> for TestKind {
    fn from(value: TestKindArg) -> Self {
        match value {
            TestKindArg::Unit => TestKind::Unit,
            TestKindArg::Functional => TestKind::Functional,
        }
    }
}
