use std::{env, sync::Arc};

use quiz_gifts::{
  plugins::{self, App},
  prelude::*,
  state::{AppState, Config},
};
use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "quiz_gifts=debug,tower_http=debug,axum=trace,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_url = env::var("DATABASE_URL")
    .unwrap_or_else(|_| "sqlite:quiz_gifts.db?mode=rwc".into());
  let port: u16 =
    env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3000);
  let config = Config::from_env()?;

  if config.admin_token.is_none() {
    warn!("ADMIN_TOKEN not set, admin endpoints are disabled");
  }

  info!("Starting quiz gift server v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(AppState::new(&db_url, config).await?);

  App::new().register(plugins::server::Plugin { port }).run(app).await;

  Ok(())
}
