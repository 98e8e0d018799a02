use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::settings::WidgetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WidgetSelection {
    Todo,
    Calendar,
    Both,
}

impl WidgetSelection {
    pub fn includes(self, kind: WidgetKind) -> bool {
        match self {
            Self::Todo => kind == WidgetKind::Todo,
            Self::Calendar => kind == WidgetKind::Calendar,
            Self::Both => true,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sill",
    version,
    about = "Sill: desktop to-do and calendar widgets",
    disable_help_subcommand = true,
    arg_required_else_help = false
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(value_enum, default_value = "both")]
    pub widgets: WidgetSelection,

    #[arg(long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    #[arg(long = "theme-config")]
    pub theme_config: Option<PathBuf>,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
