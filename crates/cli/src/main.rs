use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use channel_cli::commands;
use channel_cli::config::Cli;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    channel_observability::init(cli.log_format);

    tracing::debug!(command = ?cli.command, "starting");
    let output = commands::run(&cli)?;

    let rendered = serde_json::to_string_pretty(&output.document).context("rendering output")?;
    println!("{rendered}");

    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
