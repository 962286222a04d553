use std::sync::Arc;

use ciyu_db::PracticeStore;

use crate::ApiConfig;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn PracticeStore>,
    /// Queue length used when a request leaves `count` out
    pub default_queue_size: usize,
    pub max_queue_size: usize,
}

impl ApiState {
    pub fn new(config: &ApiConfig, store: Arc<dyn PracticeStore>) -> Self {
        Self {
            store,
            default_queue_size: config.default_queue_size,
            max_queue_size: config.max_queue_size,
        }
    }
}
