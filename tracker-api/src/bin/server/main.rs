use std::future;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use auth::PasswordHasher;
use auth::RateLimiter;
use auth::TokenService;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracker_api::config::Config;
use tracker_api::domain::user::service::RateLimits;
use tracker_api::domain::user::service::UserService;
use tracker_api::inbound::http::router::create_router;
use tracker_api::outbound::email::EmailNotifier;
use tracker_api::outbound::repositories::PostgresUserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker_api=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "tracker-api",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        password_cost = config.password.cost,
        smtp_host = ?config.email.smtp_host,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = PasswordHasher::with_cost(config.password.cost);
    let tokens = Arc::new(TokenService::new(config.jwt.secret.as_bytes()));
    let rate_limiter = Arc::new(RateLimiter::new());
    let cleanup_task = rate_limiter.spawn_cleanup(config.rate_limit.cleanup_interval());

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let notifier = Arc::new(EmailNotifier::new(&config.email));

    let user_service = Arc::new(UserService::new(
        user_repository,
        notifier,
        password_hasher,
        Arc::clone(&tokens),
        rate_limiter,
        RateLimits::from(&config.rate_limit),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, tokens);
    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup_task.shutdown().await;
    tracing::info!("Server exited");

    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

/// Resolve once `signal` fires. A signal that cannot be installed never fires.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_failed_signal_registration_keeps_serving() {
        let failed = async { Err(io::Error::new(io::ErrorKind::Other, "no signal handler")) };

        let waited = tokio::time::timeout(
            Duration::from_secs(24 * 60 * 60),
            wait_for_shutdown(failed),
        )
        .await;

        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_signal_triggers_shutdown() {
        wait_for_shutdown(async { Ok(()) }).await;
    }
}
