// Threshold bands per parameter
use super::parameter::Parameter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive numeric range, serialized as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl From<[f64; 2]> for Band {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<Band> for [f64; 2] {
    fn from(band: Band) -> Self {
        [band.min, band.max]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<Band>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Band>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Band>,
}

impl ThresholdBand {
    pub const fn new(low: Band, medium: Band, high: Band) -> Self {
        Self {
            low: Some(low),
            medium: Some(medium),
            high: Some(high),
        }
    }

    fn tiers(&self) -> [(&'static str, Option<Band>); 3] {
        [("low", self.low), ("medium", self.medium), ("high", self.high)]
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ThresholdError {
    #[error("{parameter} {tier} band has a non-finite bound")]
    NonFinite {
        parameter: Parameter,
        tier: &'static str,
    },
    #[error("{parameter} {tier} band is inverted: min {min} > max {max}")]
    Inverted {
        parameter: Parameter,
        tier: &'static str,
        min: f64,
        max: f64,
    },
}

/// Static threshold configuration, keyed by parameter.
///
/// A parameter without bands cannot be classified and always yields `none`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<ThresholdBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_pressure: Option<ThresholdBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differential_pressure: Option<ThresholdBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<ThresholdBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_volume_flow: Option<ThresholdBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<ThresholdBand>,
}

impl ThresholdTable {
    /// Zone limits used by the SMS dashboards when no thresholds file is configured.
    pub fn sms_defaults() -> Self {
        Self {
            temperature: Some(ThresholdBand::new(
                Band::new(32.0, 60.0),
                Band::new(61.0, 90.0),
                Band::new(91.0, 120.0),
            )),
            static_pressure: Some(ThresholdBand::new(
                Band::new(90.0, 140.0),
                Band::new(0.0, 10.0),
                Band::new(140.0, 2000.0),
            )),
            differential_pressure: Some(ThresholdBand::new(
                Band::new(-20.0, 0.0),
                Band::new(300.0, 400.0),
                Band::new(400.0, 1000.0),
            )),
            volume: None,
            total_volume_flow: None,
            battery: Some(ThresholdBand::new(
                Band::new(10.0, 10.5),
                Band::new(14.0, 20.0),
                Band::new(0.0, 10.0),
            )),
        }
    }

    pub fn band_for(&self, parameter: Parameter) -> Option<&ThresholdBand> {
        match parameter {
            Parameter::Temperature => self.temperature.as_ref(),
            Parameter::StaticPressure => self.static_pressure.as_ref(),
            Parameter::DifferentialPressure => self.differential_pressure.as_ref(),
            Parameter::Volume => self.volume.as_ref(),
            Parameter::TotalVolumeFlow => self.total_volume_flow.as_ref(),
            Parameter::Battery => self.battery.as_ref(),
        }
    }

    /// Look up bands by backend parameter name.
    pub fn band(&self, parameter: &str) -> Option<&ThresholdBand> {
        Parameter::from_name(parameter).and_then(|p| self.band_for(p))
    }

    pub fn validate(&self) -> Result<(), ThresholdError> {
        for parameter in Parameter::ALL {
            let Some(bands) = self.band_for(parameter) else {
                continue;
            };
            for (tier, band) in bands.tiers() {
                let Some(band) = band else { continue };
                if !band.min.is_finite() || !band.max.is_finite() {
                    return Err(ThresholdError::NonFinite { parameter, tier });
                }
                if band.min > band.max {
                    return Err(ThresholdError::Inverted {
                        parameter,
                        tier,
                        min: band.min,
                        max: band.max,
                    });
                }
            }
        }
        Ok(())
    }
}
