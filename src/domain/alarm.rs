// Alarm and reading domain models
use super::parameter::Parameter;
use super::severity::Severity;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// An alarm raised by the backend.
///
/// `device_id` and `triggered_at` are optional because upstream records are not
/// guaranteed to carry them; aggregation skips alarms missing either.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alarm {
    pub id: Option<i64>,
    pub device_id: Option<String>,
    pub parameter: String,
    pub value: f64,
    pub severity: Severity,
    pub triggered_at: Option<DateTime<Utc>>,
    pub acknowledged: bool,
}

impl Alarm {
    #[cfg(test)]
    pub fn new(
        device_id: impl Into<String>,
        parameter: impl Into<String>,
        value: f64,
        severity: Severity,
        triggered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            device_id: Some(device_id.into()),
            parameter: parameter.into(),
            value,
            severity,
            triggered_at: Some(triggered_at),
            acknowledged: false,
        }
    }

    /// Device id, treating a blank id as missing.
    pub fn device(&self) -> Option<&str> {
        self.device_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn is_active(&self) -> bool {
        !self.acknowledged
    }
}

/// One timestamped measurement set from a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reading {
    pub device_id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub temperature: Option<f64>,
    pub static_pressure: Option<f64>,
    pub differential_pressure: Option<f64>,
    pub volume: Option<f64>,
    pub total_volume_flow: Option<f64>,
    pub battery: Option<f64>,
}

impl Reading {
    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Temperature => self.temperature,
            Parameter::StaticPressure => self.static_pressure,
            Parameter::DifferentialPressure => self.differential_pressure,
            Parameter::Volume => self.volume,
            Parameter::TotalVolumeFlow => self.total_volume_flow,
            Parameter::Battery => self.battery,
        }
    }

    /// Present values in parameter order.
    pub fn values(&self) -> impl Iterator<Item = (Parameter, f64)> + '_ {
        Parameter::ALL
            .into_iter()
            .filter_map(|p| self.value(p).map(|v| (p, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_device_is_missing() {
        let mut alarm = Alarm::new("SMS-I-001", "temperature", 130.0, Severity::High, Utc::now());
        assert_eq!(alarm.device(), Some("SMS-I-001"));

        alarm.device_id = Some("   ".to_string());
        assert_eq!(alarm.device(), None);

        alarm.device_id = None;
        assert_eq!(alarm.device(), None);
    }

    #[test]
    fn test_reading_values_skip_missing() {
        let reading = Reading {
            device_id: "SMS-II-004".to_string(),
            temperature: Some(70.0),
            battery: Some(12.4),
            ..Default::default()
        };

        let values: Vec<_> = reading.values().collect();
        assert_eq!(
            values,
            vec![(Parameter::Temperature, 70.0), (Parameter::Battery, 12.4)]
        );
    }
}
