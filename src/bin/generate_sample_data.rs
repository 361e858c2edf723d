use tracing_subscriber::EnvFilter;
use yatube::{
    config::Config,
    data_seeder::{seed_sample_data, SAMPLE_PASSWORD},
    infrastructure::sqlite_database::SqliteDatabase,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    println!("Generating sample data into {}", config.database.url);

    let database = SqliteDatabase::connect(&config.database.url, config.database.max_connections).await?;
    database.initialize().await?;

    let summary = seed_sample_data(&database).await?;
    println!(
        "Created {} groups, {} users, {} posts and {} follows",
        summary.groups, summary.users, summary.posts, summary.follows
    );
    println!("Every sample user logs in with password '{}'", SAMPLE_PASSWORD);

    Ok(())
}
