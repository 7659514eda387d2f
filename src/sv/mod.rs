pub mod award;
pub mod campaign;
pub mod gift;
pub mod response;

pub use award::{Award, AwardRequest, AwardView, Granted, Outcome};
pub use campaign::Campaign;
pub use gift::Gift;
pub use response::{Participant, Response};
