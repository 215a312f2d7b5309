// Repository trait for alarm and reading data access
use crate::domain::alarm::{Alarm, Reading};
use async_trait::async_trait;

#[async_trait]
pub trait AlarmRepository: Send + Sync {
    /// Most recent alarms, newest first, at most `limit`
    async fn list_alarms(&self, limit: usize) -> anyhow::Result<Vec<Alarm>>;

    /// Most recent readings for one device
    async fn list_readings(&self, device_id: &str, limit: usize) -> anyhow::Result<Vec<Reading>>;

    /// Mark an alarm as acknowledged
    async fn acknowledge(&self, alarm_id: i64) -> anyhow::Result<()>;
}
