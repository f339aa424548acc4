//! Circle server entry point.

use std::sync::Arc;

use circle_api::{AppState, app};
use circle_common::Config;
use circle_core::{
    CommentService, CounterService, FriendService, PostService, ReactionService, TokenService,
    UserService,
};
use circle_db::repositories::{
    CommentRepository, FriendRepository, PostRepository, ReactionRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "circle=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting circle server...");

    let config = Config::load()?;

    let db = circle_db::init(&config.database).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    circle_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let friend_repo = FriendRepository::new(Arc::clone(&db));
    let reaction_repo = ReactionRepository::new(Arc::clone(&db));

    // Initialize services
    let token_service = TokenService::new(&config.auth);
    let counters = CounterService::new(
        user_repo.clone(),
        post_repo.clone(),
        comment_repo.clone(),
        friend_repo.clone(),
        reaction_repo.clone(),
    );

    let user_service = UserService::new(
        user_repo.clone(),
        friend_repo.clone(),
        token_service.clone(),
    );
    let post_service = PostService::new(
        post_repo.clone(),
        comment_repo.clone(),
        user_repo.clone(),
        friend_repo.clone(),
        counters.clone(),
    );
    let comment_service = CommentService::new(
        comment_repo.clone(),
        post_repo.clone(),
        user_repo.clone(),
        counters.clone(),
    );
    let friend_service = FriendService::new(friend_repo, user_repo, counters.clone());
    let reaction_service = ReactionService::new(reaction_repo, post_repo, comment_repo, counters);

    let state = AppState {
        user_service,
        post_service,
        comment_service,
        friend_service,
        reaction_service,
        token_service,
    };

    let app = app(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
