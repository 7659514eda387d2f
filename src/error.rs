//! Error types for the gift service

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("Campaign not found")]
  CampaignNotFound,

  #[error("Gift not found")]
  GiftNotFound,

  #[error("Response not found")]
  ResponseNotFound,

  #[error("Award not found")]
  AwardNotFound,

  #[error("Forbidden")]
  Forbidden,

  #[error("Invalid input: {0}")]
  Invalid(String),

  #[error(transparent)]
  Closed(#[from] Closed),

  #[error(transparent)]
  Claim(#[from] Claim),

  #[error("No unique gift code after {0} attempts")]
  CodeExhausted(u32),
}

/// Why a campaign is not accepting submissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Closed {
  #[error("Campaign is not active")]
  Inactive,
  #[error("Campaign has not started")]
  NotStarted,
  #[error("Campaign has ended")]
  Ended,
  #[error("Campaign participant limit reached")]
  Full,
}

/// Why an award cannot change state
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Claim {
  #[error("Gift already claimed")]
  Claimed,
  #[error("Gift expired")]
  Expired,
  #[error("Gift revoked")]
  Revoked,
}

impl Error {
  pub fn invalid(msg: impl Into<String>) -> Self {
    Self::Invalid(msg.into())
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::Database(_) | Error::CodeExhausted(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      Error::CampaignNotFound
      | Error::GiftNotFound
      | Error::ResponseNotFound
      | Error::AwardNotFound => StatusCode::NOT_FOUND,
      Error::Invalid(_) => StatusCode::BAD_REQUEST,
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::Closed(_) => StatusCode::FORBIDDEN,
      Error::Claim(_) => StatusCode::CONFLICT,
    };

    // internals stay in the logs
    let message = match &self {
      Error::Database(_) | Error::CodeExhausted(_) => {
        tracing::error!("Request failed: {self}");
        "Internal error".to_string()
      }
      other => other.to_string(),
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
