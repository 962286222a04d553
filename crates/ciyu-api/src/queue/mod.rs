mod model;
mod routes;
pub mod service;

pub use model::{QueueRequest, QueueResponse};
pub use routes::routes;
pub use service::{QueueOutcome, get_mixed_vocabulary};
