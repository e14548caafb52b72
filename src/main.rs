use anyhow::Context;
use user_accounts::{app, AppConfig, AppState, ConnectionManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "user_accounts=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env().context("load configuration")?;

    let connections = ConnectionManager::new();
    let pool = connections
        .connect(&config.database)
        .await
        .context("connect to database")?;

    let app = app::build_app(AppState::from_pool(pool));
    let served = app::serve(app, &config.host, config.port).await;

    connections.close().await;
    served
}
