//! Gift tier entity - a configured reward with a score band and stock

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  PartialEq,
  Eq,
  EnumIter,
  DeriveActiveEnum,
  Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum GiftType {
  #[default]
  #[sea_orm(string_value = "voucher")]
  Voucher,
  #[sea_orm(string_value = "discount")]
  Discount,
  #[sea_orm(string_value = "physical")]
  Physical,
  #[sea_orm(string_value = "points")]
  Points,
  #[sea_orm(string_value = "custom")]
  Custom,
}

impl GiftType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Voucher => "voucher",
      Self::Discount => "discount",
      Self::Physical => "physical",
      Self::Points => "points",
      Self::Custom => "custom",
    }
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gifts")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub campaign_id: i32,
  pub name: String,
  pub gift_type: GiftType,
  /// Display value, e.g. "50k VND" or "10%"
  pub value: String,
  pub code_prefix: Option<String>,
  /// 0 means unlimited stock
  pub quantity_total: i32,
  pub quantity_remaining: i32,
  pub min_score: i32,
  pub max_score: i32,
  /// Relative weight in percent (0-100)
  pub probability: f64,
  pub is_active: bool,
  pub valid_from: Option<DateTime>,
  pub valid_until: Option<DateTime>,
  pub created_at: DateTime,
}

impl Model {
  pub fn is_unlimited(&self) -> bool {
    self.quantity_total == 0
  }

  pub fn in_stock(&self) -> bool {
    self.is_unlimited() || self.quantity_remaining > 0
  }

  pub fn accepts_score(&self, score: i32) -> bool {
    self.min_score <= score && score <= self.max_score
  }

  pub fn valid_at(&self, now: DateTime) -> bool {
    self.valid_from.is_none_or(|from| from <= now)
      && self.valid_until.is_none_or(|until| now <= until)
  }

  /// Prefix used for claim codes, restricted to `[A-Z0-9]`.
  pub fn prefix(&self) -> String {
    let prefix: String = self
      .code_prefix
      .as_deref()
      .unwrap_or(self.gift_type.as_str())
      .chars()
      .filter(char::is_ascii_alphanumeric)
      .map(|c| c.to_ascii_uppercase())
      .collect();

    if prefix.is_empty() { self.gift_type.as_str().to_uppercase() } else { prefix }
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::campaign::Entity",
    from = "Column::CampaignId",
    to = "super::campaign::Column::Id"
  )]
  Campaign,
  #[sea_orm(has_many = "super::award::Entity")]
  Awards,
}

impl Related<super::campaign::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Campaign.def()
  }
}

impl Related<super::award::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Awards.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
