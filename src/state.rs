use std::env;

use migration::{Migrator, MigratorTrait};
use sea_orm::ConnectOptions;

use crate::{draw, prelude::*, sv};

#[derive(Debug, Clone)]
pub struct Config {
  /// Expiry for awards whose tier has no `valid_until`
  pub award_expiry: TimeDelta,
  /// Attempts at finding an unused gift code before giving up
  pub code_attempts: u32,
  /// Probability percent to integer weight multiplier (100 = basis points)
  pub probability_scale: u32,
  /// Token expected in `x-admin-token` for admin endpoints; unset disables
  /// them
  pub admin_token: Option<String>,
  /// SQLite takes one writer at a time, so the pool defaults to a single
  /// connection
  pub db_max_connections: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      award_expiry: TimeDelta::days(30),
      code_attempts: 5,
      probability_scale: 100,
      admin_token: None,
      db_max_connections: 1,
    }
  }
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let mut config = Self::default();

    if let Ok(expiry) = env::var("AWARD_EXPIRY") {
      let expiry = humantime::parse_duration(&expiry)
        .context("Invalid AWARD_EXPIRY duration")?;
      config.award_expiry =
        TimeDelta::from_std(expiry).context("AWARD_EXPIRY out of range")?;
    }

    if let Ok(attempts) = env::var("CODE_ATTEMPTS") {
      config.code_attempts =
        attempts.trim().parse().context("Invalid CODE_ATTEMPTS")?;
    }

    if let Ok(scale) = env::var("PROBABILITY_SCALE") {
      config.probability_scale =
        scale.trim().parse().context("Invalid PROBABILITY_SCALE")?;
    }

    if let Ok(max) = env::var("DATABASE_MAX_CONNECTIONS") {
      config.db_max_connections =
        max.trim().parse().context("Invalid DATABASE_MAX_CONNECTIONS")?;
    }

    config.admin_token =
      env::var("ADMIN_TOKEN").ok().filter(|token| !token.trim().is_empty());

    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> anyhow::Result<()> {
    anyhow::ensure!(self.code_attempts > 0, "CODE_ATTEMPTS must be positive");
    anyhow::ensure!(
      (1..=draw::MAX_SCALE).contains(&self.probability_scale),
      "PROBABILITY_SCALE must be between 1 and {}",
      draw::MAX_SCALE
    );
    Ok(())
  }
}

pub struct Services<'a> {
  pub campaign: sv::Campaign<'a>,
  pub gift: sv::Gift<'a>,
  pub response: sv::Response<'a>,
  pub award: sv::Award<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
}

impl AppState {
  pub async fn new(db_url: &str, config: Config) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let mut options = ConnectOptions::new(db_url);
    options.max_connections(config.db_max_connections.max(1)).sqlx_logging(false);

    let db = Database::connect(options)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    Ok(Self { db, config })
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      campaign: sv::Campaign::new(&self.db),
      gift: sv::Gift::new(&self.db),
      response: sv::Response::new(&self.db),
      award: sv::Award::new(&self.db, &self.config),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::campaign::NewCampaign;

  #[tokio::test]
  async fn test_file_database_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("gifts.db").display());

    let id = {
      let app = AppState::new(&url, Config::default()).await.unwrap();
      let campaign = app
        .sv()
        .campaign
        .create(NewCampaign::named("Lunar quiz"))
        .await
        .unwrap();
      campaign.id
    };

    // migrations are idempotent on an existing file
    let app = AppState::new(&url, Config::default()).await.unwrap();
    let campaign = app.sv().campaign.get(id).await.unwrap();
    assert_eq!(campaign.name, "Lunar quiz");
  }

  #[test]
  fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.award_expiry, TimeDelta::days(30));
    assert_eq!(config.code_attempts, 5);
    assert_eq!(config.probability_scale, 100);
    assert_eq!(config.db_max_connections, 1);
    assert!(config.admin_token.is_none());
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_scale_bounds() {
    let config = |probability_scale| Config { probability_scale, ..Config::default() };

    assert!(config(0).validate().is_err());
    assert!(config(draw::MAX_SCALE).validate().is_ok());
    assert!(config(draw::MAX_SCALE + 1).validate().is_err());
    assert!(config(u32::MAX).validate().is_err());
  }
}
