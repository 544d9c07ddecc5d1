pub mod models;
pub mod transformer;
pub mod validator;

pub use models::{CanonicalEvent, EventStatus, RawOddsRecord};
pub use transformer::transform;
pub use validator::is_valid;
