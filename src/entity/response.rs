//! Response entity - one quiz submission, append-only

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "responses")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub campaign_id: i32,
  pub participant_name: String,
  pub participant_email: String,
  pub participant_phone: Option<String>,
  pub score: i32,
  pub completed_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::campaign::Entity",
    from = "Column::CampaignId",
    to = "super::campaign::Column::Id"
  )]
  Campaign,
  #[sea_orm(has_one = "super::award::Entity")]
  Award,
}

impl Related<super::campaign::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Campaign.def()
  }
}

impl Related<super::award::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Award.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
