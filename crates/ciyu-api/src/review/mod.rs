mod model;
mod routes;
pub mod service;

pub use model::{ReviewRequest, ReviewStats};
pub use routes::routes;
pub use service::{review_stats, update_review};
