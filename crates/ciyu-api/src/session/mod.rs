mod model;
mod routes;
pub mod service;

pub use model::{
    AnswerSubmission, CompleteSessionRequest, RecordAnswerRequest, SessionSummary,
    StartSessionRequest, SubmitAnswerResponse,
};
pub use routes::routes;
pub use service::{
    NewSession, SubmitOutcome, complete_session, record_answer, session_summary,
    start_session, submit_answer,
};
