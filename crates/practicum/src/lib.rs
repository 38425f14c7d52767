//! Core library for the internship placement platform: configuration,
//! telemetry, and the lifecycle engine that drives positions, applications,
//! and internships.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod telemetry;
