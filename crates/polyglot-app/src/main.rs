use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use polyglot_config::parse_language_list;
use polyglot_types::LanguageTable;
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod controller;
mod tools;

use self::controller::{RunArgs, RunController};
use self::tools::DEFAULT_ROW_LIMIT;

/// Exit status after Ctrl+C, the shell convention for SIGINT
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "polyglot", version, about = "Build multilingual word and phrase datasets")]
struct Cli {
    /// Log as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Translate every input unit into the target languages
    Run(RunArgs),
    /// Pivot a translation cache into a wide CSV
    Export(ExportArgs),
    /// Keep the header and the first rows of a CSV
    Shrink(LimitArgs),
    /// Turn a wide word table into `text,language` rows
    Explode(LimitArgs),
}

#[derive(Debug, Args)]
struct ExportArgs {
    #[arg(long, default_value = "translation_cache.json")]
    cache: PathBuf,
    #[arg(short, long, default_value = "words.csv")]
    output: PathBuf,
    /// Comma separated target codes, every language when omitted
    #[arg(short, long)]
    languages: Option<String>,
}

#[derive(Debug, Args)]
struct LimitArgs {
    #[arg(short, long)]
    input: PathBuf,
    #[arg(short, long)]
    output: PathBuf,
    #[arg(long, default_value_t = DEFAULT_ROW_LIMIT)]
    limit: usize,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("polyglot=info,polyglot_core=info,polyglot_translator=info")
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.json);

    match execute(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Run(args) => {
            let config = args.load_config()?;
            let controller = Arc::new(RunController::new(config));

            // Shutdown on Ctrl+C; in-flight units finish and the cache is flushed
            let signal_controller = controller.clone();
            tokio::spawn(async move {
                match signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::warn!("Ctrl+C received, finishing in-flight units");
                        signal_controller.shutdown();
                    }
                    Err(e) => tracing::error!("failed to listen for ctrl+c: {e}"),
                }
            });

            let summary = controller.run().await?;
            if summary.interrupted {
                return Ok(ExitCode::from(EXIT_INTERRUPTED));
            }
            if summary.failed > 0 {
                tracing::error!(
                    failed = summary.failed,
                    "Some units failed; rerun with the same cache to retry them"
                );
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Export(args) => {
            let codes = args
                .languages
                .as_deref()
                .map(parse_language_list)
                .unwrap_or_default();
            let languages = LanguageTable::default().select(&codes)?;
            tools::export_cache(&args.cache, &args.output, &languages)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Shrink(args) => {
            tools::shrink(&args.input, &args.output, args.limit)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Explode(args) => {
            tools::explode(&args.input, &args.output, args.limit, &LanguageTable::default())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
