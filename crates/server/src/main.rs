//! Koinonia server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use koinonia_api::{middleware::AppState, router as api_router};
use koinonia_common::Config;
use koinonia_core::{
    CommentService, FollowingService, GroupService, HttpClassifier, MeetingService,
    ModerationGate, NoOpClassifier, NotificationService, ReelService, TagService, UserService,
};
use koinonia_db::repositories::{
    CommentRepository, FollowingRepository, GroupRepository, MeetingRepository,
    NotificationRepository, ReelRepository, TagRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "koinonia=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting koinonia server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = koinonia_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    koinonia_db::migrate(&db).await?;
    info!("Migrations completed");

    // Wire up the moderation gate. Publication is refused when the
    // classifier is unreachable, so disabling it is an explicit choice.
    let classifier: ModerationGate = if config.moderation.endpoint.is_empty() {
        warn!("No moderation endpoint configured; content screening is disabled");
        Arc::new(NoOpClassifier)
    } else {
        info!(endpoint = %config.moderation.endpoint, "Using HTTP moderation classifier");
        Arc::new(HttpClassifier::new(&config.moderation)?)
    };

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let reel_repo = ReelRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let meeting_repo = MeetingRepository::new(Arc::clone(&db));
    let following_repo = FollowingRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let tag_repo = TagRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo.clone());
    let reel_service = ReelService::new(
        reel_repo.clone(),
        user_repo.clone(),
        tag_repo.clone(),
        Arc::clone(&classifier),
    );
    let comment_service = CommentService::new(comment_repo, reel_repo, Arc::clone(&classifier));
    let group_service = GroupService::new(group_repo.clone());
    let meeting_service = MeetingService::new(meeting_repo, group_repo.clone());
    let following_service = FollowingService::new(following_repo.clone(), user_repo);
    let notification_service =
        NotificationService::new(notification_repo, group_repo, following_repo);
    let tag_service = TagService::new(tag_repo);

    // Create app state
    let state = AppState {
        user_service,
        reel_service,
        comment_service,
        group_service,
        meeting_service,
        following_service,
        notification_service,
        tag_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            koinonia_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
