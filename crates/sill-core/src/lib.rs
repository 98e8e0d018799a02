pub mod app;
pub mod autostart;
pub mod calendar;
pub mod cli;
pub mod datetime;
pub mod notify;
pub mod paths;
pub mod reminder;
pub mod settings;
pub mod store;
pub mod task;
pub mod theme;
pub mod tick;
pub mod views;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::info;

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        widgets = ?cli.widgets,
        "starting sill"
    );

    let data_dir = paths::resolve_data_dir(cli.data_dir.as_deref())
        .context("failed to resolve data directory")?;
    let themes = theme::ThemeSet::load(&data_dir, cli.theme_config.as_deref());

    let mut host = app::WidgetHost::open(
        &data_dir,
        cli.widgets,
        themes,
        settings::ScreenBounds::default(),
        notify::platform_notifier(),
        autostart::platform_registrar(),
    )
    .with_context(|| format!("failed to open widget host at {}", data_dir.display()))?;

    host.run()
}
