//! Agora server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use agora_api::{
    ApiRateLimiter, AppState, RateLimitConfig, app, rate_limit::rate_limit_middleware,
    security_headers,
};
use agora_common::Config;
use agora_core::{
    CommentService, LikeService, PostService, SystemService, TokenService, UserService,
    seed::seed_test_data,
};
use agora_db::repositories::{CommentRepository, LikeRepository, PostRepository, UserRepository};
use axum::{extract::DefaultBodyLimit, http::HeaderValue, middleware};
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agora=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, Box<dyn std::error::Error>> {
    let allow_origin = match origin {
        Some(origin) => AllowOrigin::exact(origin.parse::<HeaderValue>()?),
        None => AllowOrigin::from(Any),
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();

    let config = Config::load()?;
    init_tracing(config.logging.json);

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }
    info!("Starting agora server...");

    let db = Arc::new(agora_db::init(&config.database).await?);
    info!("Connected to database");

    agora_db::migrate(&db).await?;
    info!("Migrations applied");

    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));

    let state = AppState {
        user_service: UserService::new(
            user_repo.clone(),
            post_repo.clone(),
            like_repo.clone(),
            TokenService::new(&config.jwt),
        ),
        post_service: PostService::new(
            post_repo.clone(),
            user_repo.clone(),
            comment_repo.clone(),
            like_repo.clone(),
        ),
        comment_service: CommentService::new(comment_repo, post_repo.clone(), user_repo),
        like_service: LikeService::new(like_repo, post_repo),
        system_service: SystemService::new(Arc::clone(&db), config.database.clone()),
    };

    let seed_requested =
        config.database.seed_test_data || std::env::args().any(|arg| arg == "--test-data");
    if seed_requested {
        if let Err(e) = seed_test_data(
            &state.user_service,
            &state.post_service,
            &state.comment_service,
            &state.like_service,
        )
        .await
        {
            warn!(error = %e, "Failed to seed demo data");
        }
    }

    let rate_limiter = ApiRateLimiter::new(RateLimitConfig::from(&config.rate_limit));
    let cleanup = rate_limiter.spawn_cleanup();

    let router = app(state)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes));
    let router = security_headers(router)
        .layer(cors_layer(config.server.cors_origin.as_deref())?)
        .layer(TraceLayer::new_for_http());

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    cleanup.abort();
    info!("Server shutdown complete");
    Ok(())
}
