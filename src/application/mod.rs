// Application layer - Use cases over the alarm domain
pub mod aggregation;
pub mod alarm_repository;
pub mod alarm_service;
pub mod classifier;
pub mod feed_service;
