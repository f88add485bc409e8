//! CLI entry point for vitrine

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(version)]
#[command(about = "Marketing site with a JSON-driven blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Clean the public folder
    Clean,

    /// List blog content
    List {
        /// Type of content to list (articles, categories, featured)
        #[arg(default_value = "articles")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "vitrine=debug,info"
    } else {
        "vitrine=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("reading current directory")?,
    };

    match cli.command {
        Commands::Generate { watch } => {
            let site = vitrine::Site::new(&base_dir)?;
            tracing::info!("Generating static files...");

            site.generate().await?;
            println!("Generated successfully!");

            if watch {
                vitrine::commands::generate::watch(&site).await?;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let site = vitrine::Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            vitrine::server::start(&site, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let site = vitrine::Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = vitrine::Site::new(&base_dir)?;
            vitrine::commands::list::run(&site, &r#type).await?;
        }

        Commands::Version => {
            println!("vitrine version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
