//! Award entity - a gift granted to a response, identified by its claim code

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored claim state. `Expired` is never written by reads, see
/// [`Model::status_at`].
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
pub enum ClaimStatus {
  #[default]
  #[sea_orm(string_value = "awarded")]
  Awarded,
  #[sea_orm(string_value = "claimed")]
  Claimed,
  #[sea_orm(string_value = "expired")]
  Expired,
  #[sea_orm(string_value = "revoked")]
  Revoked,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "awards")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  #[sea_orm(unique)]
  pub response_id: i32,
  pub gift_id: i32,
  pub campaign_id: i32,
  #[sea_orm(unique)]
  pub gift_code: String,
  pub participant_name: String,
  pub participant_email: String,
  pub score: i32,
  pub claim_status: ClaimStatus,
  pub expires_at: DateTime,
  pub awarded_at: DateTime,
  pub claimed_at: Option<DateTime>,
}

impl Model {
  /// Status as seen at `now`: an unclaimed award past its expiry reads as
  /// expired.
  pub fn status_at(&self, now: DateTime) -> ClaimStatus {
    match self.claim_status {
      ClaimStatus::Awarded if self.expires_at < now => ClaimStatus::Expired,
      status => status,
    }
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::gift::Entity",
    from = "Column::GiftId",
    to = "super::gift::Column::Id"
  )]
  Gift,
  #[sea_orm(
    belongs_to = "super::response::Entity",
    from = "Column::ResponseId",
    to = "super::response::Column::Id"
  )]
  Response,
}

impl Related<super::gift::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Gift.def()
  }
}

impl Related<super::response::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Response.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
