//! switchshop - serve a directory of Switch packages over HTTP.
//!
//! Usage:
//!   shop [--library DIR]                      Start the HTTP server on defaults
//!   shop serve [--library DIR] [--port N]     Start the HTTP server
//!   shop list [--library DIR]                 Print the library listing
//!   shop --help                               Show help

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, FromArgMatches, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use switchshop_core::{DEFAULT_LIBRARY_PATH, DEFAULT_PORT, ShopConfig};
use switchshop_index::LibraryIndex;
use switchshop_serve::{ShopServer, format_size};

#[derive(Parser)]
#[command(
    name = "shop",
    version,
    about = "Serve a directory of Switch packages over HTTP",
    long_about = "switchshop indexes a library laid out as <root>/<title>/<file> and \
                  serves every file for download under /shop.\n\n\
                  Run `shop` to start the server, or `shop list` to print the library."
)]
struct Cli {
    #[command(flatten)]
    library: LibraryArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Clone)]
struct LibraryArgs {
    /// Library root (defaults to ./library)
    #[arg(short, long, env = "SHOP_PATH", global = true)]
    library: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct ServerArgs {
    /// Port to listen on (defaults to 3000)
    #[arg(short, long, env = "SHOP_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: IpAddr,
}

impl ServerArgs {
    /// Server options when no subcommand is given: environment and defaults only.
    fn from_env() -> Result<Self> {
        let matches = Self::augment_args(clap::Command::new("serve")).try_get_matches_from(["serve"])?;
        Ok(Self::from_arg_matches(&matches)?)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve(ServerArgs),

    /// Scan the library and print every file
    List {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve(server)) => run_serve(&cli.library, &server).await?,
        Some(Command::List { format }) => run_list(&cli.library, format).await?,
        None => run_serve(&cli.library, &ServerArgs::from_env()?).await?,
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Assemble the process-wide configuration from command line and environment.
fn build_config(library: &LibraryArgs, server: Option<&ServerArgs>) -> Result<ShopConfig> {
    let library_path = library.library.clone().unwrap_or_else(|| {
        warn!("SHOP_PATH environment variable not set, using default path");
        PathBuf::from(DEFAULT_LIBRARY_PATH)
    });

    let mut builder = ShopConfig::builder();
    builder.library_path(library_path);

    if let Some(server) = server {
        let port = server.port.unwrap_or_else(|| {
            warn!("SHOP_PORT environment variable not set, using default port");
            DEFAULT_PORT
        });
        builder.port(port).bind_address(server.bind);
    }

    builder
        .build()
        .map_err(|e| eyre!("Invalid configuration: {e}"))
}

/// Start the server and run until Ctrl-C.
async fn run_serve(library: &LibraryArgs, server: &ServerArgs) -> Result<()> {
    let config = Arc::new(build_config(library, Some(server))?);

    let mut shop = ShopServer::start(config)
        .await
        .context("Failed to start server")?;
    info!("listening on http://{}/shop", shop.addr());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("shutting down");

    shop.shutdown();
    shop.wait().await.context("Server stopped with an error")?;

    Ok(())
}

/// Scan once and print the listing.
async fn run_list(library: &LibraryArgs, format: OutputFormat) -> Result<()> {
    let config = Arc::new(build_config(library, None)?);
    let index = LibraryIndex::new(config).context("Failed to open library")?;

    eprintln!("Scanning {}...", index.config().library_path.display());
    let scan = index.scan_detailed().await.context("Scan failed")?;

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(
                " {} - {}",
                scan.root.display(),
                format_size(scan.total_size())
            );
            println!(
                " {} files, scanned in {:.2}s",
                scan.len(),
                scan.scan_duration.as_secs_f64()
            );
            println!("{}", "─".repeat(70));
            println!();

            if scan.is_empty() {
                println!(" No files found in the library.");
            }
            for file in &scan.files {
                println!(
                    " {:<44} {:>10}  {}",
                    truncate(&file.display_name, 44),
                    format_size(file.size),
                    file.parent_dir
                );
            }

            if !scan.warnings.is_empty() {
                println!();
                println!("{} warning(s) during scan", scan.warnings.len());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&scan.files)?);
        }
    }

    Ok(())
}

/// Truncate a string to at most `max_chars` characters.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 1).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_takes_port() {
        let cli = Cli::try_parse_from(["shop", "serve", "--port", "8080", "--bind", "127.0.0.1"]).unwrap();
        let Some(Command::Serve(server)) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(server.port, Some(8080));
        assert_eq!(server.bind, IpAddr::from([127, 0, 0, 1]));
    }

    #[test]
    fn test_library_is_global() {
        let cli = Cli::try_parse_from(["shop", "list", "--library", "/srv/lib"]).unwrap();
        assert_eq!(cli.library.library, Some(PathBuf::from("/srv/lib")));
        assert!(matches!(cli.command, Some(Command::List { .. })));
    }

    #[test]
    fn test_server_flags_only_on_serve() {
        assert!(Cli::try_parse_from(["shop", "--port", "8080", "serve"]).is_err());
        assert!(Cli::try_parse_from(["shop", "list", "--port", "1"]).is_err());
        assert!(Cli::try_parse_from(["shop"]).unwrap().command.is_none());
    }
}
