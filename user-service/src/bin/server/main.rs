use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenService;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::CacheConfig;
use user_service::config::Config;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::ports::UserServicePort;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::CachedUserRepository;
use user_service::outbound::repositories::InMemoryUserRepository;
use user_service::outbound::repositories::PostgresUserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        database = if config.database.url.is_some() { "postgresql" } else { "memory" },
        jwt_expiration_ms = config.jwt.expiration_ms,
        cache_enabled = config.cache.enabled,
        "Configuration loaded"
    );

    let password_hasher = PasswordHasher::with_params(config.password)?;
    let token_service = TokenService::new(config.jwt.secret.as_bytes(), config.jwt.lifetime());
    let authenticator = Arc::new(Authenticator::new(password_hasher, token_service));

    let user_service = match &config.database.url {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            build_service(
                PostgresUserRepository::new(pg_pool),
                Arc::clone(&authenticator),
                config.cache,
            )
        }
        None => {
            tracing::warn!("No database url configured, users are kept in memory only");
            build_service(
                InMemoryUserRepository::new(),
                Arc::clone(&authenticator),
                config.cache,
            )
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authenticator);
    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

fn build_service<UR>(
    repository: UR,
    authenticator: Arc<Authenticator>,
    cache: CacheConfig,
) -> Arc<dyn UserServicePort>
where
    UR: UserRepository,
{
    if cache.enabled {
        tracing::info!(max_entries = cache.max_entries, "User cache enabled");
        let repository = CachedUserRepository::new(repository, cache.max_entries);
        Arc::new(UserService::new(Arc::new(repository), authenticator))
    } else {
        Arc::new(UserService::new(Arc::new(repository), authenticator))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
