// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::Write;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atwork_attendance::config::Config;
use atwork_attendance::service::{AttendanceOutcome, AttendanceService};
use atwork_attendance::table::Table;

mod cli;
use cli::Cli;

fn init_tracing() {
    // Stderr keeps stdout free for --print.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error processing files: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.apply_to(Config::from_env().context("Loading configuration failed")?);
    info!(
        "Configuration loaded. Output dir: {}, negative span policy: {:?}",
        config.out_dir.display(),
        config.negative_span
    );

    let seating = Table::from_path(&cli.seating)
        .with_context(|| format!("reading seating roster {}", cli.seating.display()))?;
    let punch = Table::from_path(&cli.punch)
        .with_context(|| format!("reading punch log {}", cli.punch.display()))?;

    let service = AttendanceService::from_config(&config);
    let outcome = service.analyze(&seating, &punch)?;

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("creating output dir {}", config.out_dir.display()))?;
    write_outputs(&config, &outcome)?;

    if let Some(report_path) = &cli.report {
        fs::write(report_path, outcome.report.to_json()?)
            .with_context(|| format!("writing run report {}", report_path.display()))?;
        info!("Run report saved to {}", report_path.display());
    }

    if cli.print {
        print_tables(&outcome)?;
    }

    Ok(())
}

fn write_outputs(config: &Config, outcome: &AttendanceOutcome) -> Result<()> {
    let targets = [
        (config.summary_path(), &outcome.seated_summary),
        (config.visitors_path(), &outcome.visitors),
        (config.detail_path(), &outcome.detail),
    ];
    for (path, table) in targets {
        table
            .write_to_path(&path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn print_tables(outcome: &AttendanceOutcome) -> Result<()> {
    let sections = [
        ("Seated Employee Attendance Summary", &outcome.seated_summary),
        ("Visitors Without Seat Allotment", &outcome.visitors),
        ("Detail Sheet (Per Employee Per Date)", &outcome.detail),
    ];
    let mut stdout = std::io::stdout().lock();
    for (title, table) in sections {
        writeln!(stdout, "# {}", title)?;
        table.write_csv(&mut stdout)?;
        writeln!(stdout)?;
    }
    Ok(())
}
