use serde::Deserialize;

use crate::{
  entity::{CampaignStatus, campaign, response},
  prelude::*,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewCampaign {
  pub name: String,
  #[serde(default)]
  pub start_at: Option<DateTime>,
  #[serde(default)]
  pub end_at: Option<DateTime>,
  #[serde(default)]
  pub max_participants: i32,
}

impl NewCampaign {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), start_at: None, end_at: None, max_participants: 0 }
  }
}

pub struct Campaign<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Campaign<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(&self, new: NewCampaign) -> Result<campaign::Model> {
    let name = new.name.trim();
    if name.is_empty() {
      return Err(Error::invalid("campaign name is empty"));
    }
    if new.max_participants < 0 {
      return Err(Error::invalid("max_participants must not be negative"));
    }
    if let (Some(start), Some(end)) = (new.start_at, new.end_at)
      && end < start
    {
      return Err(Error::invalid("campaign ends before it starts"));
    }

    let campaign = campaign::ActiveModel {
      name: Set(name.to_string()),
      status: Set(CampaignStatus::Draft),
      start_at: Set(new.start_at),
      end_at: Set(new.end_at),
      max_participants: Set(new.max_participants),
      created_at: Set(Utc::now().naive_utc()),
      ..Default::default()
    };

    Ok(campaign.insert(self.db).await?)
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<campaign::Model>> {
    Ok(campaign::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn get(&self, id: i32) -> Result<campaign::Model> {
    self.by_id(id).await?.ok_or(Error::CampaignNotFound)
  }

  pub async fn set_status(
    &self,
    id: i32,
    status: CampaignStatus,
  ) -> Result<campaign::Model> {
    let campaign = self.get(id).await?;
    let campaign = campaign::ActiveModel { status: Set(status), ..campaign.into() }
      .update(self.db)
      .await?;

    info!("Campaign {id} is now {status:?}");
    Ok(campaign)
  }

  /// Fails unless the campaign accepts a new submission at `now`.
  pub async fn ensure_open(
    &self,
    id: i32,
    now: DateTime,
  ) -> Result<campaign::Model> {
    ensure_open(self.db, id, now).await
  }
}

pub(crate) async fn ensure_open<C: ConnectionTrait>(
  conn: &C,
  id: i32,
  now: DateTime,
) -> Result<campaign::Model> {
  let campaign = campaign::Entity::find_by_id(id)
    .one(conn)
    .await?
    .ok_or(Error::CampaignNotFound)?;

  if campaign.status != CampaignStatus::Active {
    return Err(Closed::Inactive.into());
  }
  if campaign.start_at.is_some_and(|start| now < start) {
    return Err(Closed::NotStarted.into());
  }
  if campaign.end_at.is_some_and(|end| end < now) {
    return Err(Closed::Ended.into());
  }

  if campaign.max_participants > 0 {
    let count = response::Entity::find()
      .filter(response::Column::CampaignId.eq(id))
      .count(conn)
      .await?;
    if count >= campaign.max_participants as u64 {
      return Err(Closed::Full.into());
    }
  }

  Ok(campaign)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::tests::{participant, setup_test_db};

  #[tokio::test]
  async fn test_create_is_draft() {
    let db = setup_test_db().await;
    let sv = Campaign::new(&db);

    let campaign = sv.create(NewCampaign::named("Spring quiz")).await.unwrap();

    assert_eq!(campaign.status, CampaignStatus::Draft);
    assert!(matches!(
      sv.ensure_open(campaign.id, Utc::now().naive_utc()).await,
      Err(Error::Closed(Closed::Inactive))
    ));
  }

  #[tokio::test]
  async fn test_create_rejects_bad_window() {
    let db = setup_test_db().await;
    let now = Utc::now().naive_utc();

    let new = NewCampaign {
      start_at: Some(now),
      end_at: Some(now - TimeDelta::days(1)),
      ..NewCampaign::named("Backwards")
    };

    assert!(matches!(
      Campaign::new(&db).create(new).await,
      Err(Error::Invalid(_))
    ));
  }

  #[tokio::test]
  async fn test_date_window() {
    let db = setup_test_db().await;
    let sv = Campaign::new(&db);
    let now = Utc::now().naive_utc();

    let new = NewCampaign {
      start_at: Some(now + TimeDelta::days(1)),
      end_at: Some(now + TimeDelta::days(2)),
      ..NewCampaign::named("Later")
    };
    let campaign = sv.create(new).await.unwrap();
    sv.set_status(campaign.id, CampaignStatus::Active).await.unwrap();

    assert!(matches!(
      sv.ensure_open(campaign.id, now).await,
      Err(Error::Closed(Closed::NotStarted))
    ));
    assert!(sv.ensure_open(campaign.id, now + TimeDelta::hours(36)).await.is_ok());
    assert!(matches!(
      sv.ensure_open(campaign.id, now + TimeDelta::days(3)).await,
      Err(Error::Closed(Closed::Ended))
    ));
  }

  #[tokio::test]
  async fn test_participant_cap() {
    let db = setup_test_db().await;
    let sv = Campaign::new(&db);
    let now = Utc::now().naive_utc();

    let new = NewCampaign { max_participants: 1, ..NewCampaign::named("Tiny") };
    let campaign = sv.create(new).await.unwrap();
    sv.set_status(campaign.id, CampaignStatus::Active).await.unwrap();

    crate::sv::Response::new(&db)
      .submit(campaign.id, participant("a"), 50, now)
      .await
      .unwrap();

    assert!(matches!(
      sv.ensure_open(campaign.id, now).await,
      Err(Error::Closed(Closed::Full))
    ));
  }

  #[tokio::test]
  async fn test_missing_campaign() {
    let db = setup_test_db().await;
    assert!(matches!(
      Campaign::new(&db).get(404).await,
      Err(Error::CampaignNotFound)
    ));
  }
}
