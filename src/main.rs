// Yatube Server - blog feeds, posts, comments and follows over HTTP

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use yatube::{app_state::AppState, blog_interface::create_blog_router, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;

    let app = create_blog_router(app_state);

    // Start server
    let addr = config.server_address();
    info!("Yatube server starting on http://{}", addr);
    info!("  GET       /                              - Global feed (cached {}s)", config.cache.index_ttl_secs);
    info!("  GET       /group/{{slug}}/                 - Group feed");
    info!("  GET       /profile/{{username}}/           - Profile feed");
    info!("  GET       /posts/{{post_id}}/              - Post detail");
    info!("  GET|POST  /create/                       - Create post");
    info!("  GET|POST  /posts/{{post_id}}/edit/         - Edit post");
    info!("  POST      /posts/{{post_id}}/comment/      - Add comment");
    info!("  GET       /follow/                       - Follow feed");
    info!("  GET       /profile/{{username}}/follow/    - Follow author");
    info!("  GET       /profile/{{username}}/unfollow/  - Unfollow author");
    info!("  GET|POST  /auth/signup/ /auth/login/ /auth/logout/");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
