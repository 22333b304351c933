/// Shelf Server - book recommendation backend
use clap::{Parser, Subcommand};
use shelf_server::{
    api::{self, RouterOptions},
    config::{ImageBackend, ServerConfig},
    services,
    state::AppState,
};
use shelf_storage::SqliteStore;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shelf-server")]
#[command(about = "Shelf book recommendation server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SHELF_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create a new user
    AddUser {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Email address
        #[arg(short, long)]
        email: String,
        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelf_server=info,shelf_storage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::AddUser {
            username,
            email,
            password,
        } => add_user(config, &username, &email, &password).await?,
        Commands::ListUsers => list_users(config).await?,
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<ServerConfig> {
    let config = match path {
        Some(path) => ServerConfig::load_from(path)?,
        None => ServerConfig::load()?,
    };
    config.validate()?;
    Ok(config)
}

/// Open the database and wire every service
async fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let store = Arc::new(SqliteStore::connect(&config.storage.database_url).await?);
    tracing::info!("Database connected");

    let images = services::build_image_store(&config.images).await?;
    tracing::info!(backend = ?config.images.backend, "Image store initialized");

    Ok(AppState::from_config(config, store, images))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Shelf Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let app_state = build_state(&config).await?;

    let options = RouterOptions {
        max_body_bytes: config.server.max_body_bytes,
        images_dir: (config.images.backend == ImageBackend::Local)
            .then(|| config.images.local.path.clone()),
    };
    let app = api::router(app_state, &options);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn add_user(
    config: ServerConfig,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let app_state = build_state(&config).await?;

    let user = app_state
        .credentials
        .register(username, email, password)
        .await?;

    println!("Created user {} ({})", user.username, user.id);
    Ok(())
}

async fn list_users(config: ServerConfig) -> anyhow::Result<()> {
    let app_state = build_state(&config).await?;
    let users = app_state.credentials.list_users().await?;

    println!("Users:");
    for user in users {
        println!("  {} - {} <{}>", user.id, user.username, user.email);
    }

    Ok(())
}
