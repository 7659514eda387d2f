use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_campaigns::Campaigns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Gifts::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Gifts::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Gifts::CampaignId).integer().not_null())
          .col(ColumnDef::new(Gifts::Name).string().not_null())
          .col(
            ColumnDef::new(Gifts::GiftType)
              .string()
              .not_null()
              .default("voucher"),
          )
          .col(ColumnDef::new(Gifts::Value).string().not_null())
          .col(ColumnDef::new(Gifts::CodePrefix).string().null())
          .col(
            ColumnDef::new(Gifts::QuantityTotal)
              .integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Gifts::QuantityRemaining)
              .integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Gifts::MinScore).integer().not_null().default(0))
          .col(
            ColumnDef::new(Gifts::MaxScore).integer().not_null().default(100),
          )
          .col(
            ColumnDef::new(Gifts::Probability).double().not_null().default(0.0),
          )
          .col(ColumnDef::new(Gifts::IsActive).boolean().not_null().default(true))
          .col(ColumnDef::new(Gifts::ValidFrom).date_time().null())
          .col(ColumnDef::new(Gifts::ValidUntil).date_time().null())
          .col(ColumnDef::new(Gifts::CreatedAt).date_time().not_null())
          .check(Expr::col(Gifts::QuantityRemaining).gte(0))
          .foreign_key(
            ForeignKey::create()
              .name("fk_gifts_campaign")
              .from(Gifts::Table, Gifts::CampaignId)
              .to(Campaigns::Table, Campaigns::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_gifts_campaign")
          .table(Gifts::Table)
          .col(Gifts::CampaignId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Gifts::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Gifts {
  Table,
  Id,
  CampaignId,
  Name,
  GiftType,
  Value,
  CodePrefix,
  QuantityTotal,
  QuantityRemaining,
  MinScore,
  MaxScore,
  Probability,
  IsActive,
  ValidFrom,
  ValidUntil,
  CreatedAt,
}
