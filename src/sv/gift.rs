use sea_orm::sea_query::Expr;
use serde::Deserialize;

use crate::{
  entity::{GiftType, campaign, gift},
  prelude::*,
};

fn full_range() -> i32 {
  100
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGift {
  pub name: String,
  #[serde(default)]
  pub gift_type: GiftType,
  pub value: String,
  #[serde(default)]
  pub code_prefix: Option<String>,
  /// 0 means unlimited
  #[serde(default)]
  pub quantity_total: i32,
  #[serde(default)]
  pub min_score: i32,
  #[serde(default = "full_range")]
  pub max_score: i32,
  pub probability: f64,
  #[serde(default)]
  pub valid_from: Option<DateTime>,
  #[serde(default)]
  pub valid_until: Option<DateTime>,
}

impl NewGift {
  fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::invalid("gift name is empty"));
    }
    if !(0..=100).contains(&self.min_score)
      || !(0..=100).contains(&self.max_score)
      || self.min_score > self.max_score
    {
      return Err(Error::invalid("score band must satisfy 0 <= min <= max <= 100"));
    }
    if !(0.0..=100.0).contains(&self.probability) {
      return Err(Error::invalid("probability must be between 0 and 100"));
    }
    if self.quantity_total < 0 {
      return Err(Error::invalid("quantity must not be negative"));
    }
    if let (Some(from), Some(until)) = (self.valid_from, self.valid_until)
      && until < from
    {
      return Err(Error::invalid("gift validity ends before it starts"));
    }
    Ok(())
  }
}

pub struct Gift<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Gift<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(&self, campaign_id: i32, new: NewGift) -> Result<gift::Model> {
    new.validate()?;

    campaign::Entity::find_by_id(campaign_id)
      .one(self.db)
      .await?
      .ok_or(Error::CampaignNotFound)?;

    let gift = gift::ActiveModel {
      campaign_id: Set(campaign_id),
      name: Set(new.name.trim().to_string()),
      gift_type: Set(new.gift_type),
      value: Set(new.value),
      code_prefix: Set(new.code_prefix),
      quantity_total: Set(new.quantity_total),
      quantity_remaining: Set(new.quantity_total),
      min_score: Set(new.min_score),
      max_score: Set(new.max_score),
      probability: Set(new.probability),
      is_active: Set(true),
      valid_from: Set(new.valid_from),
      valid_until: Set(new.valid_until),
      created_at: Set(Utc::now().naive_utc()),
      ..Default::default()
    };

    Ok(gift.insert(self.db).await?)
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<gift::Model>> {
    Ok(gift::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn get(&self, id: i32) -> Result<gift::Model> {
    self.by_id(id).await?.ok_or(Error::GiftNotFound)
  }

  pub async fn by_campaign(&self, campaign_id: i32) -> Result<Vec<gift::Model>> {
    let gifts = gift::Entity::find()
      .filter(gift::Column::CampaignId.eq(campaign_id))
      .order_by_asc(gift::Column::Id)
      .all(self.db)
      .await?;
    Ok(gifts)
  }

  pub async fn set_active(&self, id: i32, active: bool) -> Result<gift::Model> {
    let gift = self.get(id).await?;
    let gift = gift::ActiveModel { is_active: Set(active), ..gift.into() }
      .update(self.db)
      .await?;
    Ok(gift)
  }

  /// Changes total stock, shifting remaining stock by the same delta.
  ///
  /// The write is guarded on the remaining count that was read, so an award
  /// landing in between forces a re-read instead of being overwritten.
  pub async fn restock(&self, id: i32, quantity_total: i32) -> Result<gift::Model> {
    if quantity_total < 0 {
      return Err(Error::invalid("quantity must not be negative"));
    }

    for _ in 0..5 {
      let gift = self.get(id).await?;

      let remaining = if quantity_total == 0 {
        0
      } else {
        let delta = quantity_total - gift.quantity_total;
        (gift.quantity_remaining + delta).clamp(0, quantity_total)
      };

      let res = gift::Entity::update_many()
        .col_expr(gift::Column::QuantityTotal, Expr::value(quantity_total))
        .col_expr(gift::Column::QuantityRemaining, Expr::value(remaining))
        .filter(gift::Column::Id.eq(id))
        .filter(gift::Column::QuantityRemaining.eq(gift.quantity_remaining))
        .exec(self.db)
        .await?;

      if res.rows_affected == 1 {
        info!("Gift {id} restocked to {remaining}/{quantity_total}");
        return self.get(id).await;
      }
      debug!("Gift {id} changed during restock, retrying");
    }

    Err(Error::invalid("gift stock is changing too fast, try again"))
  }
}
