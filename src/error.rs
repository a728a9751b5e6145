// src/error.rs
use thiserror::Error;

/// Rejected hand input. Raised at the boundary so the filters never see a bad sample.
#[derive(Debug, Error, PartialEq)]
pub enum LandmarkError {
    #[error("expected {expected} landmarks per hand, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("landmark {index} has a non-finite coordinate ({x}, {y}, {z})")]
    NonFinite { index: usize, x: f64, y: f64, z: f64 },
}

/// A recorded frame whose hand failed validation, with the time it was captured at.
#[derive(Debug, Error, PartialEq)]
#[error("frame at {timestamp_ms} ms: {source}")]
pub struct FrameError {
    pub timestamp_ms: f64,
    #[source]
    pub source: LandmarkError,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be > 0 (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must lie in (0, 1) (got {value})")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("{field} must hold at least one entry")]
    EmptyWindow { field: &'static str },

    #[error("slow velocity threshold ({slow}) must be below the fast one ({fast})")]
    VelocityBands { slow: f64, fast: f64 },

    #[error("brush size {size} outside {min}..={max}")]
    BrushSize { size: f32, min: f32, max: f32 },

    #[error("invalid colour '{0}', expected #rrggbb")]
    Color(String),
}
