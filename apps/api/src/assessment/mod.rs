// Skills assessment: question bank, answer store, scoring and the session flow.
// Scoring and session transitions are pure; persistence lives in `crate::persistence`.

pub mod bank;
pub mod handlers;
pub mod models;
pub mod scoring;
pub mod session;
