// Alarm service - Use cases behind the dashboard's alarm views
use crate::application::aggregation::{
    aggregate_by_device, alarm_stats, filter_alarms, summarize_sections, top_devices, AlarmFilter,
};
use crate::application::alarm_repository::AlarmRepository;
use crate::application::classifier::{evaluate_reading, severity_profile, ParameterSeverity};
use crate::domain::aggregate::{AlarmOverview, DeviceAlarmAggregate, SectionSummary};
use crate::domain::alarm::Alarm;
use crate::domain::parameter::Parameter;
use crate::domain::severity::SeverityCounts;
use crate::domain::thresholds::ThresholdTable;
use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct DeviceSeverityReport {
    pub device_id: String,
    pub readings: usize,
    /// Banded values of the newest reading
    pub latest: Vec<ParameterSeverity>,
    pub parameters: BTreeMap<Parameter, SeverityCounts>,
}

#[derive(Clone)]
pub struct AlarmService {
    repository: Arc<dyn AlarmRepository>,
    thresholds: Arc<ThresholdTable>,
    alarm_limit: usize,
}

impl AlarmService {
    pub fn new(
        repository: Arc<dyn AlarmRepository>,
        thresholds: Arc<ThresholdTable>,
        alarm_limit: usize,
    ) -> Self {
        Self {
            repository,
            thresholds,
            alarm_limit,
        }
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    async fn fetch_alarms(&self) -> anyhow::Result<Vec<Alarm>> {
        self.repository
            .list_alarms(self.alarm_limit)
            .await
            .context("Failed to fetch alarms")
    }

    pub async fn overview(&self, top_n: usize) -> anyhow::Result<AlarmOverview> {
        let alarms = self.fetch_alarms().await?;

        let severity_counts: SeverityCounts = alarms
            .iter()
            .filter(|a| a.is_active())
            .map(|a| a.severity)
            .collect();
        let aggregates = aggregate_by_device(&alarms);

        tracing::debug!(
            alarms = alarms.len(),
            devices = aggregates.len(),
            "Computed alarm overview"
        );

        Ok(AlarmOverview {
            stats: alarm_stats(&alarms),
            severity_counts,
            top_devices: top_devices(aggregates.into_values(), top_n),
            generated_at: Utc::now(),
        })
    }

    /// Every device aggregate, in ranking order.
    pub async fn device_aggregates(&self) -> anyhow::Result<Vec<DeviceAlarmAggregate>> {
        let alarms = self.fetch_alarms().await?;
        let aggregates = aggregate_by_device(&alarms);
        let count = aggregates.len();
        Ok(top_devices(aggregates.into_values(), count))
    }

    pub async fn top_devices(&self, n: usize) -> anyhow::Result<Vec<DeviceAlarmAggregate>> {
        let alarms = self.fetch_alarms().await?;
        Ok(top_devices(aggregate_by_device(&alarms).into_values(), n))
    }

    pub async fn sections(&self) -> anyhow::Result<Vec<SectionSummary>> {
        let alarms = self.fetch_alarms().await?;
        Ok(summarize_sections(&alarms))
    }

    pub async fn alarms(&self, filter: &AlarmFilter) -> anyhow::Result<Vec<Alarm>> {
        let alarms = self.fetch_alarms().await?;
        Ok(filter_alarms(&alarms, filter))
    }

    /// Severity mix of a device's recent readings, per parameter.
    pub async fn device_severity(
        &self,
        device_id: &str,
        limit: usize,
    ) -> anyhow::Result<DeviceSeverityReport> {
        let mut readings = self
            .repository
            .list_readings(device_id, limit)
            .await
            .with_context(|| format!("Failed to fetch readings for {}", device_id))?;
        readings.sort_by_key(|r| std::cmp::Reverse(r.timestamp));

        let latest = readings
            .first()
            .map(|reading| evaluate_reading(&self.thresholds, reading))
            .unwrap_or_default();

        Ok(DeviceSeverityReport {
            device_id: device_id.to_string(),
            readings: readings.len(),
            latest,
            parameters: severity_profile(&self.thresholds, &readings),
        })
    }

    pub async fn acknowledge(&self, alarm_id: i64) -> anyhow::Result<()> {
        self.repository
            .acknowledge(alarm_id)
            .await
            .with_context(|| format!("Failed to acknowledge alarm {}", alarm_id))?;
        tracing::info!(alarm_id, "Alarm acknowledged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::alarm_repository::testing::InMemoryAlarmRepository;
    use crate::domain::alarm::Reading;
    use crate::domain::severity::Severity;
    use chrono::{Duration, TimeZone};

    fn alarm(id: i64, device: &str, severity: Severity, minute: i64) -> Alarm {
        let at = Utc.with_ymd_and_hms(2026, 1, 12, 12, 0, 0).unwrap() + Duration::minutes(minute);
        let mut alarm = Alarm::new(device, "static_pressure", 150.0, severity, at);
        alarm.id = Some(id);
        alarm
    }

    fn service(repository: InMemoryAlarmRepository) -> AlarmService {
        AlarmService::new(
            Arc::new(repository),
            Arc::new(ThresholdTable::sms_defaults()),
            100,
        )
    }

    fn fixture() -> Vec<Alarm> {
        vec![
            alarm(1, "SMS-I-001", Severity::Low, 0),
            alarm(2, "SMS-I-001", Severity::Low, 1),
            alarm(3, "SMS-I-001", Severity::High, 2),
            alarm(4, "SMS-II-007", Severity::Medium, 3),
        ]
    }

    #[tokio::test]
    async fn test_overview() {
        let service = service(InMemoryAlarmRepository::with_alarms(fixture()));
        let overview = service.overview(1).await.unwrap();

        assert_eq!(overview.stats.total, 4);
        assert_eq!(overview.stats.critical, 1);
        assert_eq!(overview.severity_counts, SeverityCounts { low: 2, medium: 1, high: 1 });
        assert_eq!(overview.top_devices.len(), 1);
        assert_eq!(overview.top_devices[0].device_id, "SMS-I-001");
        assert_eq!(overview.top_devices[0].total_count, 3);
    }

    #[tokio::test]
    async fn test_overview_of_empty_backend() {
        let service = service(InMemoryAlarmRepository::default());
        let overview = service.overview(5).await.unwrap();

        assert_eq!(overview.stats.total, 0);
        assert_eq!(overview.severity_counts.total(), 0);
        assert!(overview.top_devices.is_empty());
    }

    #[tokio::test]
    async fn test_device_aggregates_are_ranked() {
        let service = service(InMemoryAlarmRepository::with_alarms(fixture()));
        let aggregates = service.device_aggregates().await.unwrap();

        let ids: Vec<_> = aggregates.iter().map(|a| a.device_id.as_str()).collect();
        assert_eq!(ids, vec!["SMS-I-001", "SMS-II-007"]);
    }

    #[tokio::test]
    async fn test_acknowledge_clears_active_alarm() {
        let service = service(InMemoryAlarmRepository::with_alarms(fixture()));
        assert_eq!(service.overview(5).await.unwrap().stats.critical, 1);

        service.acknowledge(3).await.unwrap();
        let stats = service.overview(5).await.unwrap().stats;
        assert_eq!(stats.critical, 0);
        assert_eq!(stats.active, 3);
        assert!(service.acknowledge(99).await.is_err());
    }

    #[tokio::test]
    async fn test_device_severity() {
        let older = Utc.with_ymd_and_hms(2026, 1, 12, 10, 0, 0).unwrap();
        let mut repository = InMemoryAlarmRepository::default();
        repository.readings.insert(
            "SMS-I-001".to_string(),
            vec![
                Reading {
                    device_id: "SMS-I-001".to_string(),
                    timestamp: Some(older),
                    static_pressure: Some(100.0),
                    ..Default::default()
                },
                Reading {
                    device_id: "SMS-I-001".to_string(),
                    timestamp: Some(older + Duration::minutes(5)),
                    static_pressure: Some(150.0),
                    temperature: Some(70.0),
                    ..Default::default()
                },
            ],
        );
        let service = service(repository);

        let report = service.device_severity("SMS-I-001", 10).await.unwrap();
        assert_eq!(report.readings, 2);
        assert_eq!(
            report.parameters[&Parameter::StaticPressure],
            SeverityCounts { low: 1, medium: 0, high: 1 }
        );
        assert_eq!(
            report.parameters[&Parameter::Temperature],
            SeverityCounts { low: 0, medium: 1, high: 0 }
        );
        let latest: Vec<_> = report.latest.iter().map(|p| (p.parameter, p.severity)).collect();
        assert_eq!(
            latest,
            vec![
                (Parameter::Temperature, Severity::Medium),
                (Parameter::StaticPressure, Severity::High),
            ]
        );

        let unknown = service.device_severity("SMS-V-001", 10).await.unwrap();
        assert_eq!(unknown.readings, 0);
        assert!(unknown.latest.is_empty());
        assert!(unknown.parameters.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let service = service(InMemoryAlarmRepository::failing());
        let err = service.overview(5).await.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch alarms"));
    }
}
