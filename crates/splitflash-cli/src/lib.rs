pub mod cli;
pub mod diagnostics;
pub mod dispatch;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use splitflash_app::App;
use splitflash_core::command_runner::SystemCommandRunner;

use crate::cli::Cli;
use crate::diagnostics::DiagnosticsSession;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let diagnostics = DiagnosticsSession::initialize(cli.diagnostics)?;
    if let Some(path) = diagnostics.path() {
        eprintln!("Diagnostics enabled: {}", path.display());
    }

    let app = App::new(Arc::new(SystemCommandRunner::new()));
    let result = dispatch::run_with_deps(cli, &app);
    if let Err(error) = &result {
        diagnostics.record_failure(error);
    }
    result
}
