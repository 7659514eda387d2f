use sea_orm_migration::prelude::*;

use super::{
  m20260301_000002_create_gifts::Gifts,
  m20260301_000003_create_responses::Responses,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Awards::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Awards::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          // one award per response, enforced by the store
          .col(
            ColumnDef::new(Awards::ResponseId)
              .integer()
              .not_null()
              .unique_key(),
          )
          .col(ColumnDef::new(Awards::GiftId).integer().not_null())
          .col(ColumnDef::new(Awards::CampaignId).integer().not_null())
          .col(
            ColumnDef::new(Awards::GiftCode).string().not_null().unique_key(),
          )
          .col(ColumnDef::new(Awards::ParticipantName).string().not_null())
          .col(ColumnDef::new(Awards::ParticipantEmail).string().not_null())
          .col(ColumnDef::new(Awards::Score).integer().not_null())
          .col(
            ColumnDef::new(Awards::ClaimStatus)
              .string()
              .not_null()
              .default("awarded"),
          )
          .col(ColumnDef::new(Awards::ExpiresAt).date_time().not_null())
          .col(ColumnDef::new(Awards::AwardedAt).date_time().not_null())
          .col(ColumnDef::new(Awards::ClaimedAt).date_time().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_awards_gift")
              .from(Awards::Table, Awards::GiftId)
              .to(Gifts::Table, Gifts::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_awards_response")
              .from(Awards::Table, Awards::ResponseId)
              .to(Responses::Table, Responses::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_awards_campaign")
          .table(Awards::Table)
          .col(Awards::CampaignId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Awards::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Awards {
  Table,
  Id,
  ResponseId,
  GiftId,
  CampaignId,
  GiftCode,
  ParticipantName,
  ParticipantEmail,
  Score,
  ClaimStatus,
  ExpiresAt,
  AwardedAt,
  ClaimedAt,
}
