// Derived alarm summaries
use super::alarm::Alarm;
use super::severity::{Severity, SeverityCounts};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceAlarmAggregate {
    pub device_id: String,
    pub total_count: usize,
    pub low_count: usize,
    pub medium_count: usize,
    pub high_count: usize,
    pub last_alarm_time: Option<DateTime<Utc>>,
}

impl DeviceAlarmAggregate {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            total_count: 0,
            low_count: 0,
            medium_count: 0,
            high_count: 0,
            last_alarm_time: None,
        }
    }

    pub fn record(&mut self, severity: Severity, triggered_at: DateTime<Utc>) {
        self.total_count += 1;
        match severity {
            Severity::Low => self.low_count += 1,
            Severity::Medium => self.medium_count += 1,
            Severity::High => self.high_count += 1,
            Severity::None => {}
        }
        self.last_alarm_time = self.last_alarm_time.max(Some(triggered_at));
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlarmStats {
    pub total: usize,
    pub active: usize,
    pub critical: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub section_id: String,
    pub section_name: String,
    pub total_devices: usize,
    pub total_alarms: usize,
    pub active_alarms: usize,
    pub high_severity_alarms: usize,
    pub medium_severity_alarms: usize,
    pub recent_alarms: Vec<Alarm>,
}

/// Dashboard headline: stats, active severity mix and the worst devices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmOverview {
    pub stats: AlarmStats,
    pub severity_counts: SeverityCounts,
    pub top_devices: Vec<DeviceAlarmAggregate>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_keeps_latest_time() {
        let early = Utc.with_ymd_and_hms(2026, 1, 12, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 1, 12, 23, 14, 13).unwrap();

        let mut aggregate = DeviceAlarmAggregate::new("D1");
        aggregate.record(Severity::High, late);
        aggregate.record(Severity::None, early);

        assert_eq!(aggregate.total_count, 2);
        assert_eq!(aggregate.high_count, 1);
        assert_eq!(aggregate.low_count + aggregate.medium_count, 0);
        assert_eq!(aggregate.last_alarm_time, Some(late));
    }
}
