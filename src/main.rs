//! testadapter - Command-line test discovery adapter

use clap::Parser;
use testadapter::commands::{tool_command, DiscoverOptions};
use testadapter::error::Error;
use testadapter::report::ReportOptions;
use testadapter::ui::{CliUI, UI};

#[derive(Parser)]
#[command(name = "testadapter")]
#[command(about = "Discover tests and report them for editor test explorers", long_about = None)]
struct Cli {
    /// Base directory (defaults to current directory)
    #[arg(short = 'C', long, env = "TESTADAPTER_DIRECTORY")]
    directory: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Report a flat list of tests instead of per-root trees
    #[arg(long)]
    simple: bool,

    /// Pass the engine's stderr through
    #[arg(long)]
    no_hide_stdio: bool,

    /// Adapter command (only "discover" is supported)
    command: String,

    /// Test framework to drive
    tool: String,

    /// Extra arguments for the test framework, after `--`
    #[arg(last = true)]
    args: Vec<String>,
}

fn main() {
    // Logs go to stderr; stdout carries the report.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let cli = Cli::parse();
    let mut ui = CliUI::new();

    let options = DiscoverOptions {
        base_path: cli.directory,
        report: ReportOptions {
            pretty: cli.pretty,
            simple: cli.simple,
        },
        show_stdio: cli.no_hide_stdio,
        args: cli.args,
    };

    let result = tool_command(&cli.command, &cli.tool, options).and_then(|cmd| {
        tracing::debug!(command = cmd.name(), tool = %cli.tool, "running command");
        cmd.execute(&mut ui)
    });

    match result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(Error::DiscoveryFailed(code)) => {
            let _ = ui.error(&format!("discovery failed with exit code {}", code));
            std::process::exit(code);
        }
        Err(e) => {
            let _ = ui.error(&e.to_string());
            std::process::exit(1);
        }
    }
}
