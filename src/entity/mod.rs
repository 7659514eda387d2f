//! SeaORM entities for campaigns, gift tiers, responses and awards.

pub mod award;
pub mod campaign;
pub mod gift;
pub mod response;

pub use award::ClaimStatus;
pub use campaign::CampaignStatus;
pub use gift::GiftType;
