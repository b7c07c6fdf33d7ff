//! Yatube-rs server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yatube_common::{Config, LocalStorage};
use yatube_core::{
    CommentService, FollowService, GroupService, ImageService, PostService, UserService,
};
use yatube_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};
use yatube_web::{AppState, PageCache, router};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yatube=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting yatube-rs server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = yatube_db::init(&config).await?;

    // Run migrations
    info!("Running database migrations...");
    yatube_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    // Initialize repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(db);

    // Uploaded images
    let storage = Arc::new(LocalStorage::from_settings(&config.storage));
    info!(
        media_root = %config.storage.media_root.display(),
        media_url = %config.storage.media_url,
        "Using local media storage"
    );

    // Initialize services
    let state = AppState {
        user_service: UserService::new(user_repo.clone()),
        post_service: PostService::new(
            post_repo.clone(),
            user_repo.clone(),
            group_repo.clone(),
            follow_repo.clone(),
        ),
        group_service: GroupService::new(group_repo),
        comment_service: CommentService::new(comment_repo, post_repo, user_repo),
        follow_service: FollowService::new(follow_repo),
        image_service: ImageService::new(storage),
        page_cache: PageCache::new(Duration::from_secs(config.cache.page_ttl_secs))
            .with_max_entries(config.cache.page_max_entries),
    };

    // Build router
    let app = router(state).layer(TraceLayer::new_for_http());

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {} ({})", addr, config.server.url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
