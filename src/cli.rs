//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  diagram-studio                              Serve the UI protocol over stdin/stdout
  diagram-studio generate -p \"login flow\"     Generate a flowchart into the current directory
  diagram-studio generate -p - -t sequence    Read the description from stdin
  diagram-studio templates --query flow       List matching diagram types
  diagram-studio config                       Show config paths, settings, and API key status
  diagram-studio config set-api-key           Read the API key from stdin and store it
  diagram-studio completions bash             Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate diagram images from text or editor selections",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the API key and custom diagram types
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the session over JSON lines on stdin/stdout (default)
    Serve,
    /// Generate one diagram and write it to a file
    Generate {
        /// Diagram description (use '-' to read from stdin)
        #[arg(short = 'p', long)]
        prompt: String,
        /// Diagram type id (see `templates`)
        #[arg(short = 't', long = "template", default_value = "flowchart")]
        template: String,
        /// Output file (default: diagram-<millis>.<ext> in the current directory)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        /// Model id (overrides DIAGRAM_STUDIO_MODEL)
        #[arg(short = 'm', long)]
        model: Option<String>,
        /// Aspect ratio: 1:1, 3:4, 4:3, 9:16, or 16:9
        #[arg(long)]
        aspect_ratio: Option<String>,
    },
    /// List diagram types (built-in and custom)
    Templates {
        /// Filter by id or name
        #[arg(long)]
        query: Option<String>,
    },
    /// Show config paths, settings, and API key status
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Store the API key (reads stdin when KEY is omitted)
    SetApiKey {
        #[arg(value_name = "KEY")]
        api_key: Option<String>,
    },
    /// Remove the stored API key
    DeleteApiKey,
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
