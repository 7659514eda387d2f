use serde::Deserialize;

use crate::{entity::response, prelude::*, sv::campaign::ensure_open};

#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
  pub name: String,
  pub email: String,
  #[serde(default)]
  pub phone: Option<String>,
}

impl Participant {
  fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::invalid("participant name is empty"));
    }
    let email = self.email.trim();
    match email.split_once('@') {
      Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(()),
      _ => Err(Error::invalid("participant email is malformed")),
    }
  }
}

pub struct Response<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Response<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Records a finished quiz. The campaign must be open, and the participant
  /// cap is checked in the same transaction as the insert.
  pub async fn submit(
    &self,
    campaign_id: i32,
    participant: Participant,
    score: i32,
    now: DateTime,
  ) -> Result<response::Model> {
    if !(0..=100).contains(&score) {
      return Err(Error::invalid("score must be between 0 and 100"));
    }
    participant.validate()?;

    let txn = self.db.begin().await?;
    ensure_open(&txn, campaign_id, now).await?;

    let response = response::ActiveModel {
      campaign_id: Set(campaign_id),
      participant_name: Set(participant.name.trim().to_string()),
      participant_email: Set(participant.email.trim().to_lowercase()),
      participant_phone: Set(participant.phone),
      score: Set(score),
      completed_at: Set(now),
      ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    debug!("Response {} recorded for campaign {campaign_id}", response.id);
    Ok(response)
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<response::Model>> {
    Ok(response::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn count(&self, campaign_id: i32) -> Result<u64> {
    let count = response::Entity::find()
      .filter(response::Column::CampaignId.eq(campaign_id))
      .count(self.db)
      .await?;
    Ok(count)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::tests::{active_campaign, participant, setup_test_db};

  #[tokio::test]
  async fn test_submit() {
    let db = setup_test_db().await;
    let campaign = active_campaign(&db).await;
    let sv = Response::new(&db);
    let now = Utc::now().naive_utc();

    let response = sv
      .submit(campaign.id, participant("Lan"), 90, now)
      .await
      .unwrap();

    assert_eq!(response.score, 90);
    assert_eq!(response.participant_email, "lan@example.com");
    assert_eq!(sv.count(campaign.id).await.unwrap(), 1);
    assert_eq!(sv.by_id(response.id).await.unwrap(), Some(response));
  }

  #[tokio::test]
  async fn test_submit_validates() {
    let db = setup_test_db().await;
    let campaign = active_campaign(&db).await;
    let sv = Response::new(&db);
    let now = Utc::now().naive_utc();

    assert!(matches!(
      sv.submit(campaign.id, participant("Lan"), 101, now).await,
      Err(Error::Invalid(_))
    ));

    let mut bad = participant("Lan");
    bad.email = "not-an-email".into();
    assert!(matches!(
      sv.submit(campaign.id, bad, 50, now).await,
      Err(Error::Invalid(_))
    ));

    assert_eq!(sv.count(campaign.id).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_submit_closed_campaign() {
    let db = setup_test_db().await;
    let campaign = crate::sv::Campaign::new(&db)
      .create(crate::sv::campaign::NewCampaign::named("Draft"))
      .await
      .unwrap();

    let result = Response::new(&db)
      .submit(campaign.id, participant("Lan"), 50, Utc::now().naive_utc())
      .await;

    assert!(matches!(result, Err(Error::Closed(Closed::Inactive))));
  }
}
