// Severity classification against the threshold table
use crate::domain::alarm::Reading;
use crate::domain::parameter::Parameter;
use crate::domain::severity::{Severity, SeverityCounts};
use crate::domain::thresholds::{ThresholdBand, ThresholdTable};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSeverity {
    pub parameter: Parameter,
    pub value: f64,
    pub severity: Severity,
}

/// Classify a value for a backend parameter name.
pub fn classify(table: &ThresholdTable, parameter: &str, value: f64) -> Severity {
    classify_against(table.band(parameter), value)
}

pub fn classify_parameter(table: &ThresholdTable, parameter: Parameter, value: f64) -> Severity {
    classify_against(table.band_for(parameter), value)
}

/// Bands are tested high, then medium, then low; where bands touch, the more
/// severe one wins.
fn classify_against(bands: Option<&ThresholdBand>, value: f64) -> Severity {
    if !value.is_finite() {
        return Severity::None;
    }
    let Some(bands) = bands else {
        return Severity::None;
    };

    [
        (Severity::High, bands.high),
        (Severity::Medium, bands.medium),
        (Severity::Low, bands.low),
    ]
    .into_iter()
    .find(|(_, band)| band.is_some_and(|b| b.contains(value)))
    .map(|(severity, _)| severity)
    .unwrap_or(Severity::None)
}

pub fn count_by_severity<I>(table: &ThresholdTable, values: I, parameter: &str) -> SeverityCounts
where
    I: IntoIterator<Item = f64>,
{
    let Some(parameter) = Parameter::from_name(parameter) else {
        return SeverityCounts::default();
    };
    values
        .into_iter()
        .map(|value| classify_parameter(table, parameter, value))
        .collect()
}

/// Classified values of a reading that fall inside a band.
pub fn evaluate_reading(table: &ThresholdTable, reading: &Reading) -> Vec<ParameterSeverity> {
    reading
        .values()
        .map(|(parameter, value)| ParameterSeverity {
            parameter,
            value,
            severity: classify_parameter(table, parameter, value),
        })
        .filter(|classified| classified.severity != Severity::None)
        .collect()
}

/// Per-parameter severity counts over a batch of readings. Parameters never
/// present in the batch are omitted.
pub fn severity_profile(
    table: &ThresholdTable,
    readings: &[Reading],
) -> BTreeMap<Parameter, SeverityCounts> {
    Parameter::ALL
        .into_iter()
        .filter_map(|parameter| {
            let values: Vec<f64> = readings.iter().filter_map(|r| r.value(parameter)).collect();
            if values.is_empty() {
                return None;
            }
            Some((parameter, count_by_severity(table, values, parameter.as_str())))
        })
        .collect()
}
