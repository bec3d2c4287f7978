use anyhow::Context;
use clap::{Parser, Subcommand};
use noor_config::load as load_config;
use noor_database::{CreateUserRequest, UserRepository};
use noor_gateway::{create_router, GatewayState};
use noor_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "noor-server")]
#[command(about = "Noor preferences backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Print a user's preference snapshot as JSON
    Show {
        user_id: i64,
    },
    /// Restore a user's preferences to their defaults
    Reset {
        user_id: i64,
    },
    /// Insert a user row so preferences can be attached to it
    SeedUser {
        username: String,
        #[arg(long)]
        email: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(&config, services).await,
        Commands::Show { user_id } => show_preferences(&services, user_id).await,
        Commands::Reset { user_id } => reset_preferences(&services, user_id).await,
        Commands::SeedUser { username, email } => seed_user(&services, username, email).await,
    }
}

async fn run_server(
    config: &noor_config::AppConfig,
    services: BackendServices,
) -> anyhow::Result<()> {
    info!("starting Noor backend");

    let app = create_router(GatewayState::new(services.db_pool.clone()));

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(noor_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    services.db_pool.close().await;
    info!("backend shut down");
    Ok(())
}

async fn show_preferences(services: &BackendServices, user_id: i64) -> anyhow::Result<()> {
    let preference = services
        .preferences
        .find_by_user_id(user_id)
        .await
        .with_context(|| format!("failed to load preferences for user {user_id}"))?;

    match preference {
        Some(preference) => {
            info!(%preference, "loaded preferences");
            let snapshot = serde_json::to_string_pretty(&preference.snapshot())
                .context("failed to serialize preferences")?;
            println!("{snapshot}");
        }
        None => println!("No preferences stored for user {user_id}"),
    }

    Ok(())
}

async fn reset_preferences(services: &BackendServices, user_id: i64) -> anyhow::Result<()> {
    let preference = services
        .preferences
        .reset_to_default(user_id)
        .await
        .with_context(|| format!("failed to reset preferences for user {user_id}"))?;

    println!("Reset {preference}");
    Ok(())
}

async fn seed_user(
    services: &BackendServices,
    username: String,
    email: Option<String>,
) -> anyhow::Result<()> {
    let user = UserRepository::new(services.db_pool.clone())
        .create(&CreateUserRequest { username, email })
        .await
        .context("failed to create user")?;

    println!("Created user {} ({})", user.id, user.username);
    Ok(())
}
