use crate::db::SubmissionStore;
use crate::predict::Predictor;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn Predictor>,
    pub store: Arc<dyn SubmissionStore>,
}
