use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use photo_library_core::{BatchSummary, Config, PhotoLibrary};

#[derive(Parser)]
#[command(name = "photo-library")]
#[command(about = "Build a deduplicated, content-addressed photo library")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a source tree and index matching picture files
    Index {
        /// Root directory to scan (overrides the configured root)
        root: Option<PathBuf>,

        /// Reset and recompute derived fields of already-indexed files
        #[arg(long)]
        rebuild: bool,
    },

    /// Deduplicate indexed files into the library
    Import {
        /// Re-process every indexed file, not only unimported ones
        #[arg(long)]
        rebuild: bool,
    },

    /// Run the full pipeline: index, import, and (with --rebuild) reconcile
    Run {
        /// Root directory to scan (overrides the configured root)
        root: Option<PathBuf>,

        /// Rebuild mode: recompute derived fields and re-verify presence
        #[arg(long)]
        rebuild: bool,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "photo-library.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    // Initialize logger
    env_logger::init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Set up configuration
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Index { root, rebuild } => {
            if let Some(root) = root {
                config.root_path = root;
            }
            let rebuild = rebuild || config.rebuild;
            let library = PhotoLibrary::new(config)?;

            info!("Starting indexing pass...");
            let summary = library.index(rebuild)?;
            print_summary(&summary);
            Ok(())
        }

        Commands::Import { rebuild } => {
            let rebuild = rebuild || config.rebuild;
            let library = PhotoLibrary::new(config)?;

            info!("Starting import pass...");
            let summary = library.import(rebuild)?;
            print_summary(&summary);
            Ok(())
        }

        Commands::Run { root, rebuild } => {
            if let Some(root) = root {
                config.root_path = root;
            }
            let rebuild = rebuild || config.rebuild;
            let library = PhotoLibrary::new(config)?;

            info!("Starting full pipeline...");
            let summary = library.run(rebuild)?;
            print_summary(&summary);
            Ok(())
        }

        Commands::GenerateConfig { path } => {
            let config = Config::default();
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}

fn print_summary(summary: &BatchSummary) {
    println!("files matched:        {}", summary.files_matched);
    println!("records created:      {}", summary.records_created);
    println!("records imported:     {}", summary.records_imported);
    println!("files copied:         {}", summary.files_copied);
    println!("missing-flag changes: {}", summary.missing_flag_changes);
    println!("errors:               {}", summary.errors);
}
