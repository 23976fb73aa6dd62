//! paperfeed-cli: command-line surface for the paper collection pipeline.

use std::path::PathBuf;

use log::error;
use paperfeed_net::HttpClient;

pub mod collect;
pub mod config;
pub mod pipeline;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    pub config_path: PathBuf,
    pub update_paper_links: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run(RunArgs),
    Help,
    Version,
}

fn help_text() -> String {
    "\
paperfeed collects newly published arXiv papers per configured topic and
renders them into persisted JSON stores plus Markdown reports.

Usage:
  paperfeed [flags]

Flags:
      --config <path>        configuration file path (default config.yaml)
      --update-paper-links   backfill missing code links instead of collecting
  -h, --help                 help for paperfeed
  -v, --version              version for paperfeed
"
    .to_string()
}

pub fn parse_args(args: &[String]) -> Result<CliCommand, String> {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut update_paper_links = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "-v" | "--version" => return Ok(CliCommand::Version),
            "--update-paper-links" => update_paper_links = true,
            "--config" => {
                let Some(value) = iter.next() else {
                    return Err("--config requires a path".to_string());
                };
                config_path = PathBuf::from(value);
            }
            other => return Err(format!("unknown flag {other:?}")),
        }
    }

    Ok(CliCommand::Run(RunArgs {
        config_path,
        update_paper_links,
    }))
}

/// Entry point used by the binary; returns the process exit code.
pub fn run_cli(args: &[String]) -> i32 {
    match parse_args(args) {
        Ok(CliCommand::Help) => {
            print!("{}", help_text());
            0
        }
        Ok(CliCommand::Version) => {
            println!("paperfeed version {}", env!("CARGO_PKG_VERSION"));
            0
        }
        Ok(CliCommand::Run(run_args)) => match run(&run_args) {
            Ok(()) => 0,
            Err(err) => {
                error!("{err}");
                1
            }
        },
        Err(err) => {
            eprintln!("Error: {err}\n");
            eprint!("{}", help_text());
            2
        }
    }
}

fn run(args: &RunArgs) -> Result<(), String> {
    let config = config::load_config(&args.config_path)?;
    let client = HttpClient::new().map_err(|err| err.to_string())?;
    pipeline::run(&config, args.update_paper_links, &client)
}
