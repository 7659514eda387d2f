use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::HeaderMap,
};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{CampaignStatus, award, campaign, gift},
  prelude::*,
  state::AppState,
  sv::{
    AwardRequest, AwardView, Granted, Participant, campaign::NewCampaign,
    gift::NewGift,
  },
};

const ADMIN_HEADER: &str = "x-admin-token";

fn authorize(app: &AppState, headers: &HeaderMap) -> Result<()> {
  let Some(expected) = app.config.admin_token.as_deref() else {
    return Err(Error::Forbidden);
  };

  match headers.get(ADMIN_HEADER).and_then(|v| v.to_str().ok()) {
    Some(token) if token == expected => Ok(()),
    _ => Err(Error::Forbidden),
  }
}

pub async fn health() -> &'static str {
  "OK"
}

#[derive(Debug, Deserialize)]
pub struct SubmitReq {
  #[serde(flatten)]
  pub participant: Participant,
  pub score: i32,
}

#[derive(Debug, Serialize)]
pub struct SubmitRes {
  pub success: bool,
  pub response_id: i32,
  pub score: i32,
  pub gift: Option<Granted>,
}

/// Records a quiz submission and runs the gift draw for it.
pub async fn submit(
  State(app): State<Arc<AppState>>,
  Path(campaign_id): Path<i32>,
  Json(req): Json<SubmitReq>,
) -> Result<Json<SubmitRes>> {
  let now = Utc::now().naive_utc();
  let sv = app.sv();

  let response =
    sv.response.submit(campaign_id, req.participant, req.score, now).await?;

  let mut rng = StdRng::from_entropy();
  let outcome = sv
    .award
    .award(&AwardRequest::for_response(&response, now), &mut rng)
    .await?;

  Ok(Json(SubmitRes {
    success: true,
    response_id: response.id,
    score: response.score,
    gift: outcome.granted().cloned(),
  }))
}

pub async fn view_award(
  State(app): State<Arc<AppState>>,
  Path(code): Path<String>,
) -> Result<Json<AwardView>> {
  let view = app.sv().award.view(&code, Utc::now().naive_utc()).await?;
  Ok(Json(view))
}

pub async fn claim(
  State(app): State<Arc<AppState>>,
  Path(code): Path<String>,
) -> Result<Json<award::Model>> {
  let award = app.sv().award.claim(&code, Utc::now().naive_utc()).await?;
  Ok(Json(award))
}

pub async fn revoke(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(code): Path<String>,
) -> Result<Json<award::Model>> {
  authorize(&app, &headers)?;
  Ok(Json(app.sv().award.revoke(&code).await?))
}

pub async fn create_campaign(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(req): Json<NewCampaign>,
) -> Result<Json<campaign::Model>> {
  authorize(&app, &headers)?;
  Ok(Json(app.sv().campaign.create(req).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusReq {
  pub status: CampaignStatus,
}

pub async fn set_campaign_status(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<i32>,
  Json(req): Json<StatusReq>,
) -> Result<Json<campaign::Model>> {
  authorize(&app, &headers)?;
  Ok(Json(app.sv().campaign.set_status(id, req.status).await?))
}

pub async fn create_gift(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<i32>,
  Json(req): Json<NewGift>,
) -> Result<Json<gift::Model>> {
  authorize(&app, &headers)?;
  Ok(Json(app.sv().gift.create(id, req).await?))
}

pub async fn list_gifts(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<i32>,
) -> Result<Json<Vec<gift::Model>>> {
  authorize(&app, &headers)?;
  Ok(Json(app.sv().gift.by_campaign(id).await?))
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
  };
  use json::{Value, json};
  use tower::ServiceExt;

  use super::*;
  use crate::{plugins::server::routes, state::Config};

  async fn app() -> Arc<AppState> {
    let config = Config { admin_token: Some("secret".into()), ..Config::default() };
    Arc::new(AppState::new("sqlite::memory:", config).await.unwrap())
  }

  async fn call(
    app: &Arc<AppState>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header("content-type", "application/json")
      .header(ADMIN_HEADER, "secret");
    let req = match body {
      Some(body) => req.body(Body::from(body.to_string())).unwrap(),
      None => req.body(Body::empty()).unwrap(),
    };

    let res = routes(app.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
  }

  #[tokio::test]
  async fn test_submission_flow() {
    let app = app().await;

    let (status, campaign) =
      call(&app, "POST", "/api/campaigns", Some(json!({ "name": "Tet quiz" }))).await;
    assert_eq!(status, StatusCode::OK);
    let id = campaign["id"].as_i64().unwrap();

    let submission = json!({ "name": "Mai", "email": "mai@example.com", "score": 95 });
    let (status, body) =
      call(&app, "POST", &format!("/api/campaigns/{id}/submissions"), Some(submission.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], json!(false));

    call(&app, "POST", &format!("/api/campaigns/{id}/status"), Some(json!({ "status": "active" })))
      .await;
    let gift = json!({
      "name": "Grand prize",
      "gift_type": "physical",
      "value": "Bicycle",
      "code_prefix": "bike",
      "quantity_total": 1,
      "min_score": 80,
      "probability": 100.0
    });
    let (status, _) =
      call(&app, "POST", &format!("/api/campaigns/{id}/gifts"), Some(gift)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
      call(&app, "POST", &format!("/api/campaigns/{id}/submissions"), Some(submission)).await;
    assert_eq!(status, StatusCode::OK);
    let code = body["gift"]["code"].as_str().unwrap().to_string();
    assert!(code.starts_with("BIKE-"));

    let (_, view) = call(&app, "GET", &format!("/api/awards/{code}"), None).await;
    assert_eq!(view["status"], json!("awarded"));

    let (status, claimed) =
      call(&app, "POST", &format!("/api/awards/{code}/claim"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(claimed["claim_status"], json!("claimed"));

    let (status, _) = call(&app, "POST", &format!("/api/awards/{code}/claim"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let late = json!({ "name": "Tuan", "email": "tuan@example.com", "score": 88 });
    let (_, body) =
      call(&app, "POST", &format!("/api/campaigns/{id}/submissions"), Some(late)).await;
    assert_eq!(body["gift"], Value::Null);
  }

  #[tokio::test]
  async fn test_admin_routes_need_token() {
    let app = app().await;

    let req = Request::builder()
      .method("POST")
      .uri("/api/campaigns")
      .header("content-type", "application/json")
      .body(Body::from(json!({ "name": "x" }).to_string()))
      .unwrap();

    let res = routes(app.clone()).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn test_unknown_code() {
    let app = app().await;
    let (status, _) = call(&app, "GET", "/api/awards/GIFT-00000000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
