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
          .table(Responses::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Responses::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Responses::CampaignId).integer().not_null())
          .col(ColumnDef::new(Responses::ParticipantName).string().not_null())
          .col(ColumnDef::new(Responses::ParticipantEmail).string().not_null())
          .col(ColumnDef::new(Responses::ParticipantPhone).string().null())
          .col(ColumnDef::new(Responses::Score).integer().not_null())
          .col(ColumnDef::new(Responses::CompletedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_responses_campaign")
              .from(Responses::Table, Responses::CampaignId)
              .to(Campaigns::Table, Campaigns::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_responses_campaign")
          .table(Responses::Table)
          .col(Responses::CampaignId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Responses::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Responses {
  Table,
  Id,
  CampaignId,
  ParticipantName,
  ParticipantEmail,
  ParticipantPhone,
  Score,
  CompletedAt,
}
