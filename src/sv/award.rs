//! Gift award engine
//!
//! Awarding is idempotent per response. The stock decrement, the code
//! uniqueness check and the award insert share one transaction, and the
//! decrement is a conditional update whose affected-row count decides
//! whether the award row is written at all. The unique index on
//! `awards.response_id` backs the idempotency check.

use std::collections::HashSet;

use rand::Rng;
use sea_orm::{SqlErr, sea_query::Expr};
use serde::Serialize;

use crate::{
  draw,
  entity::{ClaimStatus, GiftType, award, gift, response},
  prelude::*,
  state::Config,
};

#[derive(Debug, Clone)]
pub struct AwardRequest {
  pub response_id: i32,
  pub campaign_id: i32,
  pub score: i32,
  pub participant_email: String,
  pub participant_name: String,
  pub now: DateTime,
}

impl AwardRequest {
  pub fn for_response(response: &response::Model, now: DateTime) -> Self {
    Self {
      response_id: response.id,
      campaign_id: response.campaign_id,
      score: response.score,
      participant_email: response.participant_email.clone(),
      participant_name: response.participant_name.clone(),
      now,
    }
  }
}

/// Gift descriptor handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Granted {
  pub award_id: i32,
  pub code: String,
  pub gift_id: i32,
  pub name: String,
  pub value: String,
  pub gift_type: GiftType,
  pub expires_at: DateTime,
  /// Set when the award already existed for this response
  #[serde(skip)]
  pub existing: bool,
}

impl Granted {
  fn new(award: &award::Model, tier: &gift::Model, existing: bool) -> Self {
    Self {
      award_id: award.id,
      code: award.gift_code.clone(),
      gift_id: tier.id,
      name: tier.name.clone(),
      value: tier.value.clone(),
      gift_type: tier.gift_type,
      expires_at: award.expires_at,
      existing,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
  NotEligible,
  Awarded(Granted),
}

impl Outcome {
  pub fn granted(&self) -> Option<&Granted> {
    match self {
      Outcome::Awarded(granted) => Some(granted),
      Outcome::NotEligible => None,
    }
  }
}

/// Award as presented to readers, with expiry applied.
#[derive(Debug, Clone, Serialize)]
pub struct AwardView {
  pub code: String,
  pub status: ClaimStatus,
  pub gift_name: String,
  pub gift_value: String,
  pub gift_type: GiftType,
  pub participant_name: String,
  pub score: i32,
  pub expires_at: DateTime,
  pub awarded_at: DateTime,
  pub claimed_at: Option<DateTime>,
}

enum Grant {
  Done(award::Model),
  SoldOut,
  Conflict,
}

pub struct Award<'a> {
  db: &'a DatabaseConnection,
  config: &'a Config,
}

impl<'a> Award<'a> {
  pub fn new(db: &'a DatabaseConnection, config: &'a Config) -> Self {
    Self { db, config }
  }

  /// Active, in-stock tiers of the campaign matching `score` at `now`,
  /// ordered by id.
  pub async fn eligible(
    &self,
    campaign_id: i32,
    score: i32,
    now: DateTime,
  ) -> Result<Vec<gift::Model>> {
    let tiers = gift::Entity::find()
      .filter(gift::Column::CampaignId.eq(campaign_id))
      .filter(gift::Column::IsActive.eq(true))
      .filter(gift::Column::MinScore.lte(score))
      .filter(gift::Column::MaxScore.gte(score))
      .order_by_asc(gift::Column::Id)
      .all(self.db)
      .await?;

    Ok(tiers.into_iter().filter(|tier| draw::eligible(tier, score, now)).collect())
  }

  pub async fn award<R: Rng + Send>(
    &self,
    req: &AwardRequest,
    rng: &mut R,
  ) -> Result<Outcome> {
    let response = response::Entity::find_by_id(req.response_id)
      .one(self.db)
      .await?
      .ok_or(Error::ResponseNotFound)?;
    if response.campaign_id != req.campaign_id {
      return Err(Error::invalid("response belongs to another campaign"));
    }

    if let Some(outcome) = self.existing(req.response_id).await? {
      return Ok(outcome);
    }

    let tiers = self.eligible(req.campaign_id, req.score, req.now).await?;
    let Some(chosen) =
      draw::select_by_probability(&tiers, self.config.probability_scale, rng)
        .cloned()
    else {
      debug!(
        "Response {} (score {}) drew no gift from {} tiers",
        req.response_id,
        req.score,
        tiers.len()
      );
      return Ok(Outcome::NotEligible);
    };

    let mut tried = HashSet::new();
    let mut conflicts = 0;
    let mut candidate = Some(chosen);

    while let Some(tier) = candidate {
      tried.insert(tier.id);

      match self.try_grant(&tier, req, rng).await? {
        Grant::Done(award) => {
          info!(
            "Awarded gift {} ({}) to response {} as {}",
            tier.id, tier.name, req.response_id, award.gift_code
          );
          return Ok(Outcome::Awarded(Granted::new(&award, &tier, false)));
        }
        Grant::Conflict => {
          if let Some(outcome) = self.existing(req.response_id).await? {
            return Ok(outcome);
          }
          // someone inserted our code between the check and the insert
          conflicts += 1;
          if conflicts >= self.config.code_attempts {
            return Err(Error::CodeExhausted(conflicts));
          }
          candidate = Some(tier);
        }
        Grant::SoldOut => {
          // a concurrent call for the same response may be the one that won
          if let Some(outcome) = self.existing(req.response_id).await? {
            return Ok(outcome);
          }
          warn!(
            "Gift {} ran out while awarding response {}, falling back",
            tier.id, req.response_id
          );
          let fresh = self.eligible(req.campaign_id, req.score, req.now).await?;
          candidate = draw::by_preference(fresh, self.config.probability_scale)
            .into_iter()
            .find(|tier| !tried.contains(&tier.id));
        }
      }
    }

    Ok(self.existing(req.response_id).await?.unwrap_or(Outcome::NotEligible))
  }

  async fn existing(&self, response_id: i32) -> Result<Option<Outcome>> {
    match self.by_response(response_id).await? {
      Some(award) => Ok(Some(Outcome::Awarded(self.granted(&award, true).await?))),
      None => Ok(None),
    }
  }

  async fn try_grant<R: Rng + Send>(
    &self,
    tier: &gift::Model,
    req: &AwardRequest,
    rng: &mut R,
  ) -> Result<Grant> {
    let txn = self.db.begin().await?;

    if !tier.is_unlimited() {
      let res = gift::Entity::update_many()
        .col_expr(
          gift::Column::QuantityRemaining,
          Expr::col(gift::Column::QuantityRemaining).sub(1),
        )
        .filter(gift::Column::Id.eq(tier.id))
        .filter(gift::Column::IsActive.eq(true))
        .filter(gift::Column::QuantityRemaining.gt(0))
        .exec(&txn)
        .await?;

      if res.rows_affected != 1 {
        txn.rollback().await?;
        return Ok(Grant::SoldOut);
      }
    }

    let code = match self.unique_code_in(&txn, &tier.prefix(), rng).await {
      Ok(code) => code,
      Err(err) => {
        txn.rollback().await?;
        return Err(err);
      }
    };
    let expires_at = tier.valid_until.unwrap_or(req.now + self.config.award_expiry);

    let inserted = award::ActiveModel {
      response_id: Set(req.response_id),
      gift_id: Set(tier.id),
      campaign_id: Set(req.campaign_id),
      gift_code: Set(code),
      participant_name: Set(req.participant_name.clone()),
      participant_email: Set(req.participant_email.clone()),
      score: Set(req.score),
      claim_status: Set(ClaimStatus::Awarded),
      expires_at: Set(expires_at),
      awarded_at: Set(req.now),
      claimed_at: Set(None),
      ..Default::default()
    }
    .insert(&txn)
    .await;

    match inserted {
      Ok(award) => {
        txn.commit().await?;
        Ok(Grant::Done(award))
      }
      Err(err)
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
      {
        txn.rollback().await?;
        Ok(Grant::Conflict)
      }
      Err(err) => Err(err.into()),
    }
  }

  /// A `PREFIX-XXXXXXXX` code not yet used by any award.
  pub async fn unique_code<R: Rng + Send + ?Sized>(
    &self,
    prefix: &str,
    rng: &mut R,
  ) -> Result<String> {
    self.unique_code_in(self.db, prefix, rng).await
  }

  async fn unique_code_in<C: ConnectionTrait, R: Rng + Send + ?Sized>(
    &self,
    conn: &C,
    prefix: &str,
    rng: &mut R,
  ) -> Result<String> {
    let attempts = self.config.code_attempts;

    for attempt in 1..=attempts {
      let code = draw::gift_code(prefix, rng);
      let taken = award::Entity::find()
        .filter(award::Column::GiftCode.eq(code.as_str()))
        .count(conn)
        .await?;

      if taken == 0 {
        return Ok(code);
      }
      debug!("Gift code collision on attempt {attempt}/{attempts}");
    }

    error!("Gave up generating a gift code for prefix {prefix}");
    Err(Error::CodeExhausted(attempts))
  }

  pub async fn by_response(&self, response_id: i32) -> Result<Option<award::Model>> {
    let award = award::Entity::find()
      .filter(award::Column::ResponseId.eq(response_id))
      .one(self.db)
      .await?;
    Ok(award)
  }

  pub async fn by_code(&self, code: &str) -> Result<award::Model> {
    award::Entity::find()
      .filter(award::Column::GiftCode.eq(code.trim().to_uppercase()))
      .one(self.db)
      .await?
      .ok_or(Error::AwardNotFound)
  }

  pub async fn by_campaign(&self, campaign_id: i32) -> Result<Vec<award::Model>> {
    let awards = award::Entity::find()
      .filter(award::Column::CampaignId.eq(campaign_id))
      .order_by_asc(award::Column::Id)
      .all(self.db)
      .await?;
    Ok(awards)
  }

  pub async fn view(&self, code: &str, now: DateTime) -> Result<AwardView> {
    let award = self.by_code(code).await?;
    let tier = self.tier(award.gift_id).await?;

    Ok(AwardView {
      status: award.status_at(now),
      code: award.gift_code,
      gift_name: tier.name,
      gift_value: tier.value,
      gift_type: tier.gift_type,
      participant_name: award.participant_name,
      score: award.score,
      expires_at: award.expires_at,
      awarded_at: award.awarded_at,
      claimed_at: award.claimed_at,
    })
  }

  /// Marks an unexpired award as claimed.
  pub async fn claim(&self, code: &str, now: DateTime) -> Result<award::Model> {
    let award = self.by_code(code).await?;
    check_transition(&award, now)?;

    let res = award::Entity::update_many()
      .col_expr(award::Column::ClaimStatus, Expr::value(ClaimStatus::Claimed))
      .col_expr(award::Column::ClaimedAt, Expr::value(Some(now)))
      .filter(award::Column::Id.eq(award.id))
      .filter(award::Column::ClaimStatus.eq(ClaimStatus::Awarded))
      .filter(award::Column::ExpiresAt.gte(now))
      .exec(self.db)
      .await?;

    let award = self.reload(award.id).await?;
    if res.rows_affected != 1 {
      check_transition(&award, now)?;
    }

    info!("Gift code {} claimed", award.gift_code);
    Ok(award)
  }

  /// Withdraws an award that has not been claimed. Expired awards can be
  /// revoked too.
  pub async fn revoke(&self, code: &str) -> Result<award::Model> {
    let award = self.by_code(code).await?;

    let res = award::Entity::update_many()
      .col_expr(award::Column::ClaimStatus, Expr::value(ClaimStatus::Revoked))
      .filter(award::Column::Id.eq(award.id))
      .filter(award::Column::ClaimStatus.eq(ClaimStatus::Awarded))
      .exec(self.db)
      .await?;

    let award = self.reload(award.id).await?;
    if res.rows_affected != 1 {
      return Err(match award.claim_status {
        ClaimStatus::Claimed => Claim::Claimed,
        ClaimStatus::Expired => Claim::Expired,
        _ => Claim::Revoked,
      }
      .into());
    }

    warn!("Gift code {} revoked", award.gift_code);
    Ok(award)
  }

  async fn reload(&self, id: i32) -> Result<award::Model> {
    award::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::AwardNotFound)
  }

  async fn tier(&self, id: i32) -> Result<gift::Model> {
    gift::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::GiftNotFound)
  }

  async fn granted(&self, award: &award::Model, existing: bool) -> Result<Granted> {
    let tier = self.tier(award.gift_id).await?;
    Ok(Granted::new(award, &tier, existing))
  }
}

fn check_transition(award: &award::Model, now: DateTime) -> Result<()> {
  match award.status_at(now) {
    ClaimStatus::Awarded => Ok(()),
    ClaimStatus::Claimed => Err(Claim::Claimed.into()),
    ClaimStatus::Expired => Err(Claim::Expired.into()),
    ClaimStatus::Revoked => Err(Claim::Revoked.into()),
  }
}
