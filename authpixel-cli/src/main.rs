use anyhow::Result;
use authpixel_cli::{commands, ConfigArgs};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "authpixel")]
#[command(about = "AuthPixel - Invisible text watermarks that survive shifts and crops", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a text watermark into an image
    Embed {
        /// Input image
        #[arg(short, long)]
        input: String,

        /// Output image (PNG recommended)
        #[arg(short, long)]
        output: String,

        /// Watermark text (printable ASCII)
        #[arg(short, long)]
        text: String,

        #[command(flatten)]
        settings: ConfigArgs,
    },

    /// Recover the watermark from an image
    Decode {
        /// Input image
        #[arg(short, long)]
        input: String,

        /// Output JSON file for the decode report
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        settings: ConfigArgs,
    },

    /// Show how much text an image can carry
    Capacity {
        /// Input image
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        settings: ConfigArgs,
    },

    /// Show scan statistics and every candidate group
    Scan {
        /// Input image
        #[arg(short, long)]
        input: String,

        /// Output JSON file for the scan report
        #[arg(short, long)]
        output: Option<String>,

        /// Show statistics only
        #[arg(long)]
        stats_only: bool,

        #[command(flatten)]
        settings: ConfigArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Embed {
            input,
            output,
            text,
            settings,
        } => commands::embed::execute(&input, &output, &text, &settings.resolve()?),

        Commands::Decode {
            input,
            output,
            settings,
        } => commands::decode::execute(&input, output.as_deref(), &settings.resolve()?).map(|_| ()),

        Commands::Capacity { input, settings } => {
            commands::capacity::execute(&input, &settings.resolve()?).map(|_| ())
        }

        Commands::Scan {
            input,
            output,
            stats_only,
            settings,
        } => commands::scan::execute(&input, output.as_deref(), stats_only, &settings.resolve()?),
    }
}
