use blog_api::{
    seed::{SeedError, seed_example_data},
    server::{self, ServerState},
};
use blog_db::{DbClient, DbError, MemoryStore};
use serde::Deserialize;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error setting up the database: {0}")]
    Database(#[from] DbError),
    #[error("Error seeding example data: {0}")]
    Seed(#[from] SeedError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
    database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    database_max_connections: u32,
    #[serde(default)]
    seed_example_data: bool,
}

fn default_max_connections() -> u32 {
    5
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "blog_api=debug,blog_core=debug,blog_db=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

async fn connect_storage(env: &Env) -> Result<ServerState, InitError> {
    let Some(database_url) = &env.database_url else {
        warn!("DATABASE_URL is not set, data is kept in memory and lost on shutdown");
        let store = Arc::new(MemoryStore::new());
        return Ok(ServerState::new(store.clone(), store));
    };

    let db = Arc::new(DbClient::connect(database_url, env.database_max_connections).await?);
    db.migrate().await?;

    Ok(ServerState::new(db.clone(), db))
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "Could not listen for Ctrl-C");
        return;
    }

    info!("Shutting down");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let state = connect_storage(&env).await?;
    if env.seed_example_data {
        seed_example_data(&state.users, &state.posts).await?;
    }

    let app = server::app(state);

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}
