// Application state for HTTP handlers
use crate::application::alarm_service::AlarmService;
use crate::application::feed_service::AlarmFeedService;

#[derive(Clone)]
pub struct AppState {
    pub alarm_service: AlarmService,
    pub feed_service: AlarmFeedService,
    pub default_top_n: usize,
}
