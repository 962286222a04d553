pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod middleware;
pub mod normalization;
pub mod queue;
pub mod review;
pub mod router;
pub mod session;
pub mod state;
pub mod tracing;
pub mod v1;
pub mod validation;

pub use config::ApiConfig;
pub use context::LearnerScope;
pub use state::ApiState;
