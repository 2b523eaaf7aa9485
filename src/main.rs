mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use pdfpages::commands::split::{SplitOptions, SplitTarget};
use pdfpages::page_range::ParseMode;
use pdfpages::{commands, mcp};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the MCP transport.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Info { path } => {
            commands::info::run(&path)?;
        }
        Commands::Combine {
            inputs,
            pages,
            output,
            strict,
        } => {
            commands::combine::run(&inputs, &pages, &output, ParseMode::from_strict(strict))?;
        }
        Commands::Split {
            path,
            ranges,
            archive,
            output_dir,
            base_name,
            strict,
        } => {
            let target = match (archive, output_dir) {
                (Some(archive), _) => SplitTarget::Archive(archive),
                (None, Some(dir)) => SplitTarget::Directory(dir),
                (None, None) => anyhow::bail!("Either --archive or --output-dir is required"),
            };
            let options = SplitOptions {
                ranges,
                base_name,
                mode: ParseMode::from_strict(strict),
            };
            commands::split::run(&path, &options, &target)?;
        }
        Commands::Rotate {
            path,
            angle,
            output,
        } => {
            commands::rotate::run(&path, angle, output.as_deref())?;
        }
    }

    Ok(())
}
