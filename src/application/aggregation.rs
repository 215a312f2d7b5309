// Alarm aggregation - per device, per section and top-N views
use crate::domain::aggregate::{AlarmStats, DeviceAlarmAggregate, SectionSummary};
use crate::domain::alarm::Alarm;
use crate::domain::severity::Severity;
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, HashMap, HashSet};

const RECENT_ALARMS_PER_SECTION: usize = 5;
const UNASSIGNED_SECTION: &str = "unassigned";

/// Pipeline sections reported even when they have no alarms.
const PIPELINE_SECTIONS: [(&str, &str); 5] = [
    ("I", "Section I - Multan/BWP/Sahiwal"),
    ("II", "Section II"),
    ("III", "Section III"),
    ("IV", "Section IV"),
    ("V", "Section V"),
];

/// Query-string style filter over an alarm list.
#[derive(Debug, Clone, Default)]
pub struct AlarmFilter {
    pub acknowledged: Option<bool>,
    pub severity: Option<Severity>,
    pub limit: Option<usize>,
}

/// Group alarms by device. Alarms without a device id or trigger time are skipped.
pub fn aggregate_by_device<'a, I>(alarms: I) -> HashMap<String, DeviceAlarmAggregate>
where
    I: IntoIterator<Item = &'a Alarm>,
{
    let mut aggregates: HashMap<String, DeviceAlarmAggregate> = HashMap::new();
    let mut skipped = 0usize;

    for alarm in alarms {
        let (Some(device_id), Some(triggered_at)) = (alarm.device(), alarm.triggered_at) else {
            skipped += 1;
            tracing::warn!(
                alarm_id = ?alarm.id,
                parameter = %alarm.parameter,
                "Skipping malformed alarm without device id or trigger time"
            );
            continue;
        };

        aggregates
            .entry(device_id.to_string())
            .or_insert_with(|| DeviceAlarmAggregate::new(device_id))
            .record(alarm.severity, triggered_at);
    }

    tracing::debug!(skipped, devices = aggregates.len(), "Aggregated alarms by device");

    aggregates
}

/// Ranking used by every top-N view: most alarms first, then the most recently
/// alarming device, then device id.
pub fn rank(a: &DeviceAlarmAggregate, b: &DeviceAlarmAggregate) -> Ordering {
    b.total_count
        .cmp(&a.total_count)
        .then_with(|| b.last_alarm_time.cmp(&a.last_alarm_time))
        .then_with(|| a.device_id.cmp(&b.device_id))
}

/// The `n` highest-ranked aggregates. Empty input yields an empty list.
pub fn top_devices<I>(aggregates: I, n: usize) -> Vec<DeviceAlarmAggregate>
where
    I: IntoIterator<Item = DeviceAlarmAggregate>,
{
    let mut ranked: Vec<_> = aggregates.into_iter().collect();
    ranked.sort_by(rank);
    ranked.truncate(n);
    ranked
}

pub fn alarm_stats(alarms: &[Alarm]) -> AlarmStats {
    alarms.iter().fold(AlarmStats::default(), |mut stats, alarm| {
        stats.total += 1;
        if alarm.is_active() {
            stats.active += 1;
            if alarm.severity == Severity::High {
                stats.critical += 1;
            }
        }
        stats
    })
}

/// Newest first; alarms without a trigger time sort last.
pub fn filter_alarms(alarms: &[Alarm], filter: &AlarmFilter) -> Vec<Alarm> {
    let mut selected: Vec<Alarm> = alarms
        .iter()
        .filter(|a| filter.acknowledged.is_none_or(|ack| a.acknowledged == ack))
        .filter(|a| filter.severity.is_none_or(|s| a.severity == s))
        .cloned()
        .collect();
    selected.sort_by_key(|a| Reverse(a.triggered_at));
    if let Some(limit) = filter.limit {
        selected.truncate(limit);
    }
    selected
}

/// Section id from an SMS device id, e.g. `SMS-III-021` -> `III`.
pub fn section_of(device_id: &str) -> Option<&str> {
    let mut parts = device_id.trim().splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(prefix), Some(section), Some(_))
            if prefix.eq_ignore_ascii_case("sms") && !section.is_empty() =>
        {
            Some(section)
        }
        _ => None,
    }
}

fn section_name(section_id: &str) -> String {
    match PIPELINE_SECTIONS.iter().find(|(id, _)| *id == section_id) {
        Some((_, name)) => name.to_string(),
        None if section_id == UNASSIGNED_SECTION => "Unassigned".to_string(),
        None => format!("Section {}", section_id),
    }
}

fn summarize_section(section_id: String, mut alarms: Vec<&Alarm>) -> SectionSummary {
    alarms.sort_by_key(|a| Reverse(a.triggered_at));

    let devices: HashSet<&str> = alarms.iter().filter_map(|a| a.device()).collect();
    let active: Vec<&&Alarm> = alarms.iter().filter(|a| a.is_active()).collect();

    SectionSummary {
        section_name: section_name(&section_id),
        section_id,
        total_devices: devices.len(),
        total_alarms: alarms.len(),
        active_alarms: active.len(),
        high_severity_alarms: active.iter().filter(|a| a.severity == Severity::High).count(),
        medium_severity_alarms: active
            .iter()
            .filter(|a| a.severity == Severity::Medium)
            .count(),
        recent_alarms: alarms
            .iter()
            .take(RECENT_ALARMS_PER_SECTION)
            .map(|a| (*a).clone())
            .collect(),
    }
}

/// Alarm summaries per pipeline section. Sections I to V always come first, zero-filled
/// when quiet; any other section follows in id order.
pub fn summarize_sections(alarms: &[Alarm]) -> Vec<SectionSummary> {
    let mut grouped: BTreeMap<String, Vec<&Alarm>> = BTreeMap::new();
    for alarm in alarms {
        let Some(device_id) = alarm.device() else {
            continue;
        };
        let section = section_of(device_id).unwrap_or(UNASSIGNED_SECTION);
        grouped.entry(section.to_string()).or_default().push(alarm);
    }

    let mut summaries: Vec<SectionSummary> = PIPELINE_SECTIONS
        .iter()
        .map(|(id, _)| summarize_section(id.to_string(), grouped.remove(*id).unwrap_or_default()))
        .collect();
    summaries.extend(
        grouped
            .into_iter()
            .map(|(section_id, section_alarms)| summarize_section(section_id, section_alarms)),
    );
    summaries
}
