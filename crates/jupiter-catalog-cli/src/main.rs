//! Jupiter Catalog entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use jupiter_catalog::renderer::chromium::find_chromium;
use jupiter_catalog::ScraperConfig;
use jupiter_catalog_cli::{export, query, repl, report};
use jupiter_catalog_cli::{resolve_catalog_path, setup_logging, LogFormat};

#[derive(Parser)]
#[command(
    name = "jupiter-catalog",
    about = "Scrape, query and export the JupiterWeb course catalog",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log line format on stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the catalog form and save the extracted catalog.
    Scrape {
        /// Number of units to visit, in dropdown order.
        #[arg(long, default_value_t = 2)]
        units: usize,

        /// JSON configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Entry page of the form.
        #[arg(long)]
        base_url: Option<String>,

        /// Show the browser window.
        #[arg(long)]
        headed: bool,

        /// Where to save the catalog (default: $JUPITER_CATALOG or ./catalog.json).
        #[arg(short, long)]
        output: Option<String>,

        /// Also export disciplines to this CSV file.
        #[arg(long)]
        csv: Option<String>,

        /// Open the query shell when done.
        #[arg(short, long)]
        interactive: bool,
    },

    /// Query a saved catalog interactively.
    Repl {
        /// Catalog file.
        #[arg(short, long)]
        catalog: Option<String>,
    },

    /// Print statistics of a saved catalog.
    Stats {
        /// Catalog file.
        #[arg(short, long)]
        catalog: Option<String>,
    },

    /// Export a saved catalog.
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file.
        #[arg(short, long)]
        output: String,

        /// Catalog file.
        #[arg(short, long)]
        catalog: Option<String>,
    },

    /// Check that a Chromium binary can be found.
    Doctor {
        /// JSON configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   jupiter-catalog completions bash > ~/.local/share/bash-completion/completions/jupiter-catalog
    ///   jupiter-catalog completions zsh > ~/.zfunc/_jupiter-catalog
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    setup_logging(&cli.log_level, cli.log_format);

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Scrape {
            units,
            config,
            base_url,
            headed,
            output,
            csv,
            interactive,
        } => {
            let mut scraper = ScraperConfig::load(config.as_deref())?;
            if let Some(url) = base_url {
                scraper.base_url = url;
            }
            if headed {
                scraper.headless = false;
            }

            let catalog = jupiter_catalog::run(&scraper, units)
                .await
                .context("scrape failed")?;

            print!("{}", report::scrape_summary(&catalog));

            let catalog_path = resolve_catalog_path(output.as_deref());
            export::save_catalog(&catalog, &catalog_path)?;
            println!("Catalog saved to {}", catalog_path.display());

            if let Some(name) = csv {
                let path = export::csv_path(&name);
                let rows = export::export_csv(&catalog, &path)?;
                println!("Exported {rows} rows to {}", path.display());
            }

            if interactive {
                repl::run(&catalog)?;
            }
        }

        Commands::Repl { catalog } => {
            let path = resolve_catalog_path(catalog.as_deref());
            let catalog = export::load_catalog(&path)?;
            repl::run(&catalog)?;
        }

        Commands::Stats { catalog } => {
            let path = resolve_catalog_path(catalog.as_deref());
            let catalog = export::load_catalog(&path)?;
            println!("Catalog: {}", path.display());
            print!("{}", report::statistics(&query::statistics(&catalog)));
        }

        Commands::Export {
            format,
            output,
            catalog,
        } => {
            let path = resolve_catalog_path(catalog.as_deref());
            let catalog = export::load_catalog(&path)?;
            match format {
                ExportFormat::Csv => {
                    let out = export::csv_path(&output);
                    let rows = export::export_csv(&catalog, &out)?;
                    println!("Exported {rows} rows to {}", out.display());
                }
                ExportFormat::Json => {
                    let out = PathBuf::from(&output);
                    export::save_catalog(&catalog, &out)?;
                    println!("Exported {} units to {}", catalog.len(), out.display());
                }
            }
        }

        Commands::Doctor { config } => {
            let scraper = ScraperConfig::load(config.as_deref())?;
            match find_chromium(scraper.chromium_path.as_deref()) {
                Some(path) => {
                    println!("Chromium: {}", path.display());
                    println!("Base URL: {}", scraper.base_url);
                    println!("Headless: {}", scraper.headless);
                }
                None => anyhow::bail!(
                    "Chromium not found. Set JUPITER_CHROMIUM_PATH or install Chrome/Chromium."
                ),
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "jupiter-catalog", &mut std::io::stdout());
        }
    }

    Ok(())
}
