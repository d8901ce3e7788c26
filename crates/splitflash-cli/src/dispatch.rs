use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table};
use splitflash_app::{App, Overrides};
use splitflash_core::doctor::{CheckState, DoctorReport};
use splitflash_core::firmware::Build;
use splitflash_core::format::{format_date, format_size};
use tracing::info;

use crate::cli::{Cli, Command};

pub fn run_with_deps(cli: Cli, app: &App) -> Result<()> {
    let overrides = Overrides {
        base_dir: cli.base_dir,
        volume_path: cli.volume,
    };

    match cli.command {
        Some(Command::Doctor) => run_doctor_command(app, &overrides),
        Some(Command::List) => run_list_command(app, &overrides),
        None => run_root_command(app, &overrides),
    }
}

fn run_root_command(app: &App, overrides: &Overrides) -> Result<()> {
    let settings = app.settings(overrides)?;
    info!(
        base_dir = %settings.base_dir.display(),
        volume = %settings.volume_path.display(),
        "starting flasher"
    );

    splitflash_tui::run(app.start_session(&settings))
}

fn run_doctor_command(app: &App, overrides: &Overrides) -> Result<()> {
    let report = app.doctor(overrides)?;
    print_doctor_report(&report);
    Ok(())
}

fn run_list_command(app: &App, overrides: &Overrides) -> Result<()> {
    let settings = app.settings(overrides)?;
    let builds = app.list_builds(&settings)?;

    if builds.is_empty() {
        println!("No firmware builds in {}", settings.firmware_dir.display());
        return Ok(());
    }

    println!("{}", builds_table(&builds));
    Ok(())
}

fn print_doctor_report(report: &DoctorReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Check", "Status", "Details"]);

    for check in &report.checks {
        let status = match check.state {
            CheckState::Pass => "PASS",
            CheckState::Fail => "FAIL",
        };

        table.add_row(vec![
            Cell::new(check.name.as_str()),
            Cell::new(status),
            Cell::new(check.details.as_str()),
        ]);
    }

    println!("{table}");
    println!("{}", report.summary());
}

fn builds_table(builds: &[Build]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Date", "Files", "Left", "Right", "Reset", "Size"]);

    for build in builds {
        let files: Vec<&str> = build.files.iter().map(|file| file.name.as_str()).collect();
        table.add_row(vec![
            Cell::new(format_date(&build.date)),
            Cell::new(files.join("\n")),
            Cell::new(flag(build.has_left)),
            Cell::new(flag(build.has_right)),
            Cell::new(flag(build.has_reset)),
            Cell::new(format_size(build.total_size())),
        ]);
    }
    table
}

fn flag(present: bool) -> &'static str {
    if present { "yes" } else { "-" }
}
