use clap::{Parser, Subcommand};
use reactimail::db::{self, services::{AccountService, NewAccount}};
use reactimail::server::config::ServerConfig;
use reactimail::services::clock::SystemClock;
use reactimail::web::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::{Duration, interval};
use tracing::{debug, error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const PURGE_INTERVAL_SECONDS: u64 = 60;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create an account from the command line
    CreateAccount {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        staff: bool,
        /// Superusers are always staff
        #[arg(long)]
        superuser: bool,
    },
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "reactimail.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            error!(error = %e, "Failed to install SIGTERM handler; waiting for Ctrl+C only.");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down..."),
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Received Ctrl+C, shutting down...");
}

async fn serve(config: Arc<ServerConfig>, db_pool: sea_orm::DatabaseConnection) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app_state = Arc::new(AppState::new(db_pool, config.clone(), Arc::new(SystemClock)));

    // --- Expired session / rate-limit window cleanup ---
    let state_for_purge = app_state.clone();
    let purge_task = tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(PURGE_INTERVAL_SECONDS));
        loop {
            interval.tick().await;
            state_for_purge.purge_expired();
            debug!(
                sessions = state_for_purge.sessions.len(),
                counters = state_for_purge.login_counters.len(),
                "Purged expired sessions and rate limit windows."
            );
        }
    });

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "HTTP server listening");

    let app = web::create_axum_router(app_state);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Box::new)?;

    purge_task.abort();
    info!("Server stopped.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let server_config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load server configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&server_config.log_dir);
    info!("Starting reactimail, version: {}", env!("CARGO_PKG_VERSION"));

    // --- Database Setup ---
    let db_pool = db::connect(&server_config.database_url, 10).await?;
    db::ensure_schema(&db_pool).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(server_config, db_pool).await,
        Command::CreateAccount {
            email,
            password,
            staff,
            superuser,
        } => {
            let new_account = NewAccount {
                is_staff: staff,
                is_superuser: superuser,
                ..NewAccount::new(email, password)
            };
            match AccountService::create_account(
                &db_pool,
                new_account,
                server_config.password_hash_cost,
            )
            .await
            {
                Ok(account) => {
                    println!("Created account {} ({})", account.id, account.email);
                    Ok(())
                }
                Err(e) => {
                    error!(error = %e, "Failed to create account.");
                    Err(e.into())
                }
            }
        }
    }
}
