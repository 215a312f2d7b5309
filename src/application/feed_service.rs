// Alarm feed service - Periodic overview snapshots pushed to subscribers
use crate::application::alarm_service::AlarmService;
use crate::domain::aggregate::AlarmOverview;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

pub const MIN_REFRESH: Duration = Duration::from_secs(5);
pub const MAX_REFRESH: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AlarmFeedService {
    alarm_service: AlarmService,
    refresh: Duration,
}

impl AlarmFeedService {
    pub fn new(alarm_service: AlarmService, refresh: Duration) -> Self {
        Self {
            alarm_service,
            refresh: refresh.clamp(MIN_REFRESH, MAX_REFRESH),
        }
    }

    pub fn refresh(&self) -> Duration {
        self.refresh
    }

    /// Start a feed for one subscriber. The first snapshot is sent immediately;
    /// the task stops once the receiver is dropped.
    pub fn subscribe(&self, top_n: usize) -> mpsc::Receiver<AlarmOverview> {
        let (tx, rx) = mpsc::channel(4);
        let service = self.alarm_service.clone();

        let mut interval = tokio::time::interval(self.refresh);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(interval);

        tokio::spawn(async move {
            while ticks.next().await.is_some() {
                if tx.is_closed() {
                    break;
                }
                match service.overview(top_n).await {
                    Ok(overview) => {
                        if tx.send(overview).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %format!("{e:#}"), "Skipping alarm feed refresh");
                    }
                }
            }
            tracing::debug!("Alarm feed subscriber disconnected");
        });

        rx
    }
}
