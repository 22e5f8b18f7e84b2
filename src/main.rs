use std::fs;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use coursehub::auth::TokenGenerator;
use coursehub::config::{HubConfig, ServerConfig};
use coursehub::directory::Directory;
use coursehub::files::BackupStorage;
use coursehub::notify::LogNotifier;
use coursehub::search::{SearchEngine, SearchOptions};
use coursehub::server::{AppState, create_router};
use coursehub::store::{SqliteStore, Store};
use coursehub::sync::{SyncController, UpstreamClient};
use coursehub::types::{SitePrivacy, Token};

fn create_admin_token(generator: &TokenGenerator) -> anyhow::Result<(Token, String)> {
    let (raw_token, lookup, hash) = generator.generate()?;
    let token = Token {
        id: Uuid::new_v4().to_string(),
        token_hash: hash,
        token_lookup: lookup,
        is_admin: true,
        site_id: None,
        created_at: Utc::now(),
        expires_at: None,
        last_used_at: None,
    };
    Ok((token, raw_token))
}

#[cfg(unix)]
fn set_restrictive_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "coursehub")]
#[command(about = "A course directory hub", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for database and uploaded files
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Public name of this hub
        #[arg(long, default_value = "Course Hub")]
        hub_name: String,

        /// Public description of this hub
        #[arg(long)]
        hub_description: Option<String>,

        /// Contact name shown in the hub info
        #[arg(long)]
        contact_name: Option<String>,

        /// Contact email shown in the hub info
        #[arg(long)]
        contact_email: Option<String>,

        /// Main language of this hub
        #[arg(long, default_value = "en")]
        language: String,

        /// Hub visibility: public, private or hidden
        #[arg(long, default_value = "public")]
        privacy: String,

        /// Serve 503 on every hub route without touching the data
        #[arg(long)]
        disabled: bool,

        /// Search page size
        #[arg(long, default_value = "50")]
        max_results: i64,

        /// Default per-site publication quota per 24h
        #[arg(long, default_value = "10")]
        max_publications_per_day: i64,
    },

    /// Pull the site register of an upstream hub and merge it locally
    Sync {
        /// Base URL of the upstream hub
        #[arg(long)]
        upstream: String,

        /// Admin token issued by the upstream hub
        #[arg(long)]
        token: String,

        /// Data directory holding the local database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the hub (create database, seed tag options, admin token)
    Init {
        /// Data directory for database and uploaded files
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

fn run_init(data_dir: String) -> anyhow::Result<()> {
    let data_path: std::path::PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join("coursehub.db");
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    let token_file = data_path.join(".admin_token");

    if store.has_admin_token()? {
        bail!(
            "Hub already initialized. Admin token exists at: {}",
            token_file.display()
        );
    }

    let generator = TokenGenerator::new();
    let (token, raw_token) = create_admin_token(&generator)?;

    store.create_token(&token)?;
    fs::write(&token_file, &raw_token)?;

    #[cfg(unix)]
    set_restrictive_permissions(&token_file);

    println!();
    println!("========================================");
    println!("Admin token (save this, it won't be shown again):");
    println!();
    println!("  {raw_token}");
    println!();
    println!("Token also written to: {}", token_file.display());
    println!("========================================");
    println!();

    Ok(())
}

fn open_store(data_dir: &str) -> anyhow::Result<SqliteStore> {
    let config = ServerConfig {
        data_dir: data_dir.into(),
        ..ServerConfig::default()
    };

    let token_file = config.data_dir.join(".admin_token");
    if !token_file.exists() {
        bail!(
            "Hub not initialized. Run 'coursehub admin init' first to create the database and admin token."
        );
    }

    let store = SqliteStore::new(config.db_path())?;
    if !store.has_admin_token()? {
        bail!(
            "Hub not initialized. Run 'coursehub admin init' first to create the database and admin token."
        );
    }

    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("coursehub=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init { data_dir } => {
                run_init(data_dir)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            hub_name,
            hub_description,
            contact_name,
            contact_email,
            language,
            privacy,
            disabled,
            max_results,
            max_publications_per_day,
        } => {
            let privacy = SitePrivacy::from_str(&privacy)
                .ok_or_else(|| anyhow::anyhow!("invalid privacy value: {privacy}"))?;

            let server_config = ServerConfig {
                host,
                port,
                data_dir: data_dir.clone().into(),
            };
            let hub_config = HubConfig {
                enabled: !disabled,
                name: hub_name,
                description: hub_description,
                contact_name,
                contact_email,
                language,
                privacy,
                max_results,
                max_publications_per_day,
            };

            let store = Arc::new(open_store(&data_dir)?);
            info!(
                "Admin token available at {}",
                server_config.data_dir.join(".admin_token").display()
            );

            let notifier = Arc::new(LogNotifier);
            let state = Arc::new(AppState {
                store: store.clone(),
                directory: Directory::new(store.clone(), hub_config.clone(), notifier.clone()),
                search: SearchEngine::new(store, SearchOptions, &hub_config),
                backups: BackupStorage::new(&server_config.data_dir),
                config: hub_config,
                notifier,
                restorer: None,
            });

            let app = create_router(state);
            let addr = server_config.socket_addr()?;

            info!("Starting hub on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
        Commands::Sync {
            upstream,
            token,
            data_dir,
        } => {
            let store = Arc::new(open_store(&data_dir)?);
            let directory = Directory::new(
                store,
                HubConfig::default(),
                Arc::new(LogNotifier),
            );

            let controller = SyncController::new(UpstreamClient::new(upstream, token));
            let summary = controller.run(&directory).await?;

            println!(
                "Synchronized site register: {} inserted, {} updated, {} deactivated",
                summary.inserted, summary.updated, summary.deactivated
            );
        }
    }

    Ok(())
}
