// Mapper from backend JSON records to domain types
use crate::domain::alarm::{Alarm, Reading};
use crate::domain::severity::Severity;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AlarmRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub client_id: Option<String>,
    pub parameter: String,
    pub value: f64,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub is_acknowledged: bool,
    #[serde(default)]
    pub triggered_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReadingRecord {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub static_pressure: Option<f64>,
    #[serde(default)]
    pub differential_pressure: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub total_volume_flow: Option<f64>,
    #[serde(default)]
    pub battery: Option<f64>,
}

/// Backend timestamps are RFC 3339, or naive ISO-8601 which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y/%m/%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

pub fn alarm_from_record(record: AlarmRecord) -> Alarm {
    let triggered_at = record.triggered_at.as_deref().and_then(parse_timestamp);
    if triggered_at.is_none() && record.triggered_at.is_some() {
        tracing::debug!(alarm_id = ?record.id, "Unparseable alarm timestamp");
    }

    Alarm {
        id: record.id,
        device_id: record.client_id,
        parameter: record.parameter,
        value: record.value,
        severity: record
            .severity
            .as_deref()
            .map(Severity::from_label)
            .unwrap_or_default(),
        triggered_at,
        acknowledged: record.is_acknowledged,
    }
}

pub fn reading_from_record(device_id: &str, record: ReadingRecord) -> Reading {
    Reading {
        device_id: record.client_id.unwrap_or_else(|| device_id.to_string()),
        timestamp: record.timestamp.as_deref().and_then(parse_timestamp),
        temperature: record.temperature,
        static_pressure: record.static_pressure,
        differential_pressure: record.differential_pressure,
        volume: record.volume,
        total_volume_flow: record.total_volume_flow,
        battery: record.battery,
    }
}

/// Decode each element independently so one bad record does not drop the batch.
pub fn decode_each<T>(values: Vec<serde_json::Value>, kind: &str) -> Vec<T>
where
    T: for<'de> Deserialize<'de>,
{
    let total = values.len();
    let decoded: Vec<T> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(kind, error = %e, "Skipping undecodable record");
                None
            }
        })
        .collect();

    if decoded.len() < total {
        tracing::debug!(kind, total, decoded = decoded.len(), "Decoded backend records");
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 12, 23, 14, 13).unwrap();
        assert_eq!(parse_timestamp("2026-01-12T23:14:13Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-13T04:14:13+05:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-12T23:14:13"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-12 23:14:13.000"), Some(expected));
        assert_eq!(parse_timestamp("2026/1/12 23:14:13"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_alarm_from_record() {
        let records: Vec<AlarmRecord> = decode_each(
            vec![json!({
                "id": 17,
                "device_id": 4,
                "client_id": "SMS-I-002",
                "parameter": "static_pressure",
                "value": 151.2,
                "threshold_type": "high",
                "severity": "critical",
                "is_acknowledged": false,
                "triggered_at": "2026-01-12T23:14:13.512000"
            })],
            "alarm",
        );
        let alarm = alarm_from_record(records.into_iter().next().unwrap());

        assert_eq!(alarm.id, Some(17));
        assert_eq!(alarm.device(), Some("SMS-I-002"));
        assert_eq!(alarm.severity, Severity::High);
        assert!(alarm.is_active());
        assert!(alarm.triggered_at.is_some());
    }

    #[test]
    fn test_decode_skips_bad_records() {
        let records: Vec<AlarmRecord> = decode_each(
            vec![
                json!({"client_id": "SMS-I-001", "parameter": "battery", "value": 9.0}),
                json!({"client_id": "SMS-I-001", "parameter": "battery", "value": "n/a"}),
                json!("garbage"),
            ],
            "alarm",
        );
        assert_eq!(records.len(), 1);

        let alarm = alarm_from_record(records.into_iter().next().unwrap());
        assert_eq!(alarm.severity, Severity::None);
        assert_eq!(alarm.triggered_at, None);
    }

    #[test]
    fn test_reading_defaults_device() {
        let record: ReadingRecord = serde_json::from_value(json!({
            "timestamp": "2026-01-12T23:14:13",
            "temperature": 71.5,
            "battery": 12.9,
            "specific_gravity": 0.6
        }))
        .unwrap();

        let reading = reading_from_record("SMS-IV-030", record);
        assert_eq!(reading.device_id, "SMS-IV-030");
        assert_eq!(reading.temperature, Some(71.5));
        assert_eq!(reading.static_pressure, None);
    }
}
