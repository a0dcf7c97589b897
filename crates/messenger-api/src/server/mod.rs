//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::sync::Arc;

use axum::Router;
use messenger_cache::{create_shared_pool, RedisEventNotifier, RedisPoolConfig};
use messenger_common::{
    AppConfig, AppError, ClaimsIdentityProvider, HttpIdentityProvider, JwtService,
};
use messenger_core::traits::{EventNotifier, IdentityProvider};
use messenger_core::SnowflakeGenerator;
use messenger_db::{
    create_pool, run_migrations, MemoryStore, PgChatRepository, PgMessageRepository,
    PgReactionRepository, PgUserRepository,
};
use messenger_service::{BroadcastNotifier, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_rate_limit, MiddlewareOptions};
use crate::routes::{api_routes, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// Rate limiting covers `/api` only; health probes bypass it.
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();

    let api = apply_rate_limit(api_routes(), &config.rate_limit)?;
    let router = Router::new().merge(health_routes()).merge(api);

    let options = MiddlewareOptions {
        cors: &config.cors,
        request_timeout: config.timeouts.request(),
        is_production: config.app.env.is_production(),
        expose_error_details: config.app.env.is_development(),
    };
    let router = apply_middleware(router, &options);

    Ok(router.with_state(state))
}

/// Initialize all dependencies and create AppState
///
/// Without `DATABASE_URL` every repository runs in memory; without
/// `REDIS_URL` events stay in process.
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let mut builder = ServiceContextBuilder::new().storage_timeout(config.timeouts.storage());

    // Storage
    builder = match &config.database {
        Some(database) => {
            info!("Connecting to PostgreSQL...");
            let db_config = messenger_db::DatabaseConfig {
                max_connections: database.max_connections,
                min_connections: database.min_connections,
                ..messenger_db::DatabaseConfig::new(database.url.clone())
            }
            .with_acquire_timeout(config.timeouts.storage());
            let pool = create_pool(&db_config)
                .await
                .map_err(|e| AppError::Unavailable(format!("PostgreSQL: {e}")))?;
            info!("PostgreSQL connection established");

            if database.run_migrations {
                run_migrations(&pool)
                    .await
                    .map_err(|e| AppError::Config(format!("Migrations failed: {e}")))?;
            }

            builder
                .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
                .chat_repo(Arc::new(PgChatRepository::new(pool.clone())))
                .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
                .reaction_repo(Arc::new(PgReactionRepository::new(pool.clone())))
                .pool(pool)
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store");
            builder.memory_store(MemoryStore::new())
        }
    };

    // Event fan-out
    let notifier: Arc<dyn EventNotifier> = match &config.redis {
        Some(redis) => {
            let pool_config =
                RedisPoolConfig::from(redis).with_wait_timeout(config.timeouts.storage());
            let redis_pool = create_shared_pool(pool_config)
                .map_err(|e| AppError::Unavailable(format!("Redis: {e}")))?;
            builder = builder.redis_pool(redis_pool.clone());
            Arc::new(RedisEventNotifier::new(redis_pool))
        }
        None => {
            info!("REDIS_URL not set; events stay in process");
            Arc::new(BroadcastNotifier::default())
        }
    };

    // Identity
    let identity_provider: Arc<dyn IdentityProvider> = match &config.identity.api_url {
        Some(url) => Arc::new(
            HttpIdentityProvider::new(
                url.clone(),
                config.identity.api_key.clone(),
                config.timeouts.storage(),
            )
            .map_err(|e| AppError::Config(format!("Identity provider client: {e}")))?,
        ),
        None => Arc::new(ClaimsIdentityProvider),
    };
    let jwt_service = Arc::new(JwtService::new(
        &config.identity.jwt_secret,
        config.identity.jwt_issuer.clone(),
    ));

    let snowflake_generator = Arc::new(
        SnowflakeGenerator::new(config.snowflake.worker_id)
            .map_err(|e| AppError::Config(e.to_string()))?,
    );

    let service_context = builder
        .notifier(notifier)
        .identity_provider(identity_provider)
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Serve until SIGINT/SIGTERM, then drain in-flight requests
pub async fn run_server(app: Router, listener: TcpListener) -> Result<(), AppError> {
    let addr = listener
        .local_addr()
        .map_err(|e| AppError::Config(format!("Listener address: {e}")))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Release storage handles after the server stops
pub async fn close_resources(state: &AppState) {
    let ctx = state.service_context();
    if let Some(pool) = ctx.pool() {
        pool.close().await;
        info!("PostgreSQL pool closed");
    }
    if let Some(redis) = ctx.redis_pool() {
        redis.close();
        info!("Redis pool closed");
    }
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();

    let state = create_app_state(config).await?;
    let app = create_app(state.clone())?;

    info!("Starting HTTP server on {}", addr);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    let served = run_server(app, listener).await;
    close_resources(&state).await;
    served
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable; waiting for Ctrl+C");
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
