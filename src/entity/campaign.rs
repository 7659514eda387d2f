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
pub enum CampaignStatus {
  #[default]
  #[sea_orm(string_value = "draft")]
  Draft,
  #[sea_orm(string_value = "active")]
  Active,
  #[sea_orm(string_value = "inactive")]
  Inactive,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
  pub status: CampaignStatus,
  pub start_at: Option<DateTime>,
  pub end_at: Option<DateTime>,
  /// 0 means no cap
  pub max_participants: i32,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::gift::Entity")]
  Gifts,
  #[sea_orm(has_many = "super::response::Entity")]
  Responses,
}

impl Related<super::gift::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Gifts.def()
  }
}

impl Related<super::response::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Responses.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
