use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ladder::{
    database, AppState, Args, InMemoryOutcomeResolver, LogAnnouncer, OutcomeResolver,
    Repositories, Settings,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ladder=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!(error = %e, "Ladder server stopped");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from(&args);
    info!(season = %settings.season, "Starting ladder server");

    let repositories = match &args.database_url {
        Some(url) => {
            let pool = database::connect(url, settings.connect_timeout).await?;
            database::migrate(&pool).await?;
            Repositories::postgres(pool, &settings.season)
        }
        None => {
            warn!("DATABASE_URL not set, keeping all data in memory");
            Repositories::in_memory(&settings.season)
        }
    };
    repositories.seasons.ensure_season().await?;

    let resolver: Arc<dyn OutcomeResolver> = match &args.outcomes_file {
        Some(path) => Arc::new(InMemoryOutcomeResolver::from_json_file(path).await?),
        None => Arc::new(InMemoryOutcomeResolver::new()),
    };

    let state = AppState::new(repositories, &settings, resolver, Arc::new(LogAnnouncer));
    let app = ladder::router(state);

    let listener = tokio::net::TcpListener::bind(args.bind_address).await?;
    info!("Server running on http://{}", args.bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
