//! # Diagram Studio
//!
//! Turns text descriptions or editor selections into diagram images.
//!
//! ## Modes
//! - `serve` (default): session protocol as JSON lines on stdin/stdout, for editor hosts
//! - `generate`: one-shot generation to a file
//! - `templates`, `config`, `completions`: plain-text helpers

mod bridge;
mod cli;
mod core;
mod run;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use cli::{Args, Commands, ConfigSubcommand};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(&args);

    match args.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = Args::command();
            cli::generate(shell, &mut cmd, core::app::NAME, &mut std::io::stdout());
        }
        Some(Commands::Templates { ref query }) => {
            let config_dir = core::cli::require_config_dir(args.config_dir.as_deref());
            core::cli::run_templates(&config_dir, query.as_deref());
        }
        Some(Commands::Config { ref subcommand }) => {
            let config_dir = core::cli::require_config_dir(args.config_dir.as_deref());
            match subcommand {
                None => core::cli::run_config(&config_dir).await,
                Some(ConfigSubcommand::SetApiKey { api_key }) => {
                    core::cli::run_config_set_api_key(&config_dir, api_key.clone()).await
                }
                Some(ConfigSubcommand::DeleteApiKey) => {
                    core::cli::run_config_delete_api_key(&config_dir).await
                }
            }
        }
        Some(Commands::Generate {
            prompt,
            template,
            output,
            model,
            aspect_ratio,
        }) => {
            let config_dir = core::cli::require_config_dir(args.config_dir.as_deref());
            let opts = run::GenerateOptions {
                prompt,
                template,
                output,
                model,
                aspect_ratio,
            };
            if let Err(e) = run::run_generate(&config_dir, opts).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve) | None => {
            let config_dir = core::paths::resolve_config_dir(args.config_dir.as_deref());
            run::run_serve(config_dir.as_deref()).await?;
        }
    }
    Ok(())
}
