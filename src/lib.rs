//! Air writing core: turns per-frame hand landmarks into a debounced pen
//! signal, a smoothed cursor and connected stroke segments.
//!
//! ```no_run
//! use air_writer::{AirWriterConfig, DrawingSession, FrameSource};
//!
//! let mut session = DrawingSession::new(AirWriterConfig::default());
//! for frame in FrameSource::synthetic(90).flatten() {
//!     let output = session.process_frame(frame.hand.as_ref(), frame.timestamp_ms);
//!     println!("{:?}: {} commands", output.pinch, output.commands.len());
//! }
//! ```

pub mod canvas;
pub mod config;
pub mod data;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod session;
pub mod smoothing;
pub mod source;
pub mod stroke;
pub mod tracking;

pub use canvas::{Canvas, RasterCanvas, RenderCommand};
pub use config::AirWriterConfig;
pub use error::{ConfigError, FrameError, LandmarkError};
pub use gesture::{PinchDetector, PinchState};
pub use session::{DrawingSession, FrameOutput, SessionStats};
pub use smoothing::AdaptiveSmoother;
pub use source::{FrameSource, Recording, SourceFrame};
pub use stroke::{StrokeRenderer, StrokeSegment};
pub use tracking::Hand;
