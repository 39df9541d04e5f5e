//! One-shot digest run from the command line (cron jobs, local testing).

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use reddit_digest::config::{self, AppConfig};
use reddit_digest::deliver::{DigestSender, FileSender};
use reddit_digest::runtime::{build_sender, DigestRuntime};

#[derive(Debug, Parser)]
#[command(name = "send-digest", about = "Build and send the Reddit digest once")]
struct Cli {
    /// Sections file (TOML or JSON). Falls back to config/ and then the built-in table.
    #[arg(long, env = "DIGEST_SECTIONS_PATH")]
    sections: Option<PathBuf>,

    /// Write the HTML to this file instead of emailing it.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

async fn run(cli: Cli) -> anyhow::Result<reddit_digest::RunReport> {
    let mut cfg = AppConfig::from_env();
    let sections = match &cli.sections {
        Some(p) => config::load_sections_from(p)?,
        None => config::load_sections_default()?,
    };

    let runtime = match cli.out {
        Some(path) => {
            cfg.recipient.get_or_insert_with(|| "preview@localhost".to_string());
            let sender: Arc<dyn DigestSender> = Arc::new(FileSender::new(path));
            DigestRuntime::with_sender(cfg, sections, sender)?
        }
        None => {
            let sender = build_sender(&cfg)?;
            DigestRuntime::with_sender(cfg, sections, sender)?
        }
    };
    Ok(runtime.run().await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    reddit_digest::init_tracing();

    match run(Cli::parse()).await {
        Ok(report) => {
            println!(
                "✓ Digest sent with {} posts across {} sections",
                report.posts, report.sections
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Digest generation failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
