mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use empresas_store::{migrate_file, JsonFileStore};
use empresas_web::ServerConfig;

#[derive(Parser)]
#[command(
    name = "empresas",
    version,
    about = "Company/site registry backed by a JSON file, with a password-gated admin API"
)]
struct Cli {
    /// Path to the JSON data file
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Skip normalizing the data file on startup
        #[arg(long)]
        no_migrate: bool,
    },

    /// Normalize the data file: fill missing fields and renumber duplicate ids
    Migrate,

    /// Show the active configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;
    let data_path = cli.data.unwrap_or_else(|| cfg.store.path.clone());

    match cli.command {
        Commands::Serve {
            port,
            host,
            no_migrate,
        } => empresas_web::run_server(ServerConfig {
            host: host.unwrap_or(cfg.server.host),
            port: port.unwrap_or(cfg.server.port),
            data_path,
            admin_password: cfg.admin.password,
            migrate_on_start: !no_migrate,
        }),
        Commands::Migrate => cmd_migrate(data_path),
        Commands::Config => cmd_config(&cfg, &data_path),
    }
}

fn cmd_migrate(data_path: PathBuf) -> Result<()> {
    let store = JsonFileStore::new(data_path);
    let report = migrate_file(&store).context("data migration failed")?;

    if report.created {
        println!("Created {} with an empty collection.", store.path().display());
        return Ok(());
    }
    if report.reset {
        println!("{} did not hold an array; reset to empty.", store.path().display());
        return Ok(());
    }
    println!(
        "Migrated {}: {} records, {} repaired, {} renumbered.",
        store.path().display(),
        report.total,
        report.repaired,
        report.renumbered
    );
    Ok(())
}

fn cmd_config(cfg: &config::Config, data_path: &std::path::Path) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    println!();
    println!("[server]");
    println!("  host = {}", cfg.server.host);
    println!("  port = {}", cfg.server.port);
    println!();
    println!("[store]");
    println!("  path = {}", data_path.display());
    println!();
    println!("[admin]");
    println!("  password = {}", "*".repeat(cfg.admin.password.len().min(8)));
    Ok(())
}
