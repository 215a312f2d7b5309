// Domain layer - Alarm, reading and threshold models
pub mod aggregate;
pub mod alarm;
pub mod parameter;
pub mod severity;
pub mod thresholds;
