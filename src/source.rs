// src/source.rs - Where landmark frames come from: recorded sessions or a synthetic hand
use std::f64::consts::TAU;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::CanvasConfig;
use crate::error::FrameError;
use crate::tracking::{landmarks, Hand, HAND_LANDMARK_COUNT};

/// One tracker result: a timestamp and at most one hand.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFrame {
    pub timestamp_ms: f64,
    pub hand: Option<Hand>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub timestamp_ms: f64,
    /// Raw `[x, y, z]` triples, validated only when the frame is replayed.
    #[serde(default)]
    pub hand: Option<Vec<[f64; 3]>>,
}

/// A captured tracker session stored as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recording {
    /// Canvas the session was captured for; replay uses the configured one when absent.
    #[serde(default)]
    pub canvas: Option<CanvasConfig>,
    pub frames: Vec<RecordedFrame>,
}

impl Recording {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(anyhow::anyhow!("Recording does not exist: {}", path.display()));
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recording {}", path.display()))?;
        let recording: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid recording JSON in {}", path.display()))?;
        info!(frames = recording.frames.len(), path = %path.display(), "recording loaded");
        Ok(recording)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write recording {}", path.display()))
    }

    /// Capture every frame a source yields. A frame whose hand failed validation
    /// is kept at its timestamp with no hand.
    pub fn capture(source: impl Iterator<Item = Result<SourceFrame, FrameError>>) -> Self {
        let frames = source
            .map(or_empty)
            .map(|frame| RecordedFrame {
                timestamp_ms: frame.timestamp_ms,
                hand: frame.hand.map(Vec::from),
            })
            .collect();
        Self { canvas: None, frames }
    }
}

pub struct RecordingReader {
    frames: std::vec::IntoIter<RecordedFrame>,
}

/// Deterministic stand-in for a live tracker: the index fingertip traces a
/// figure eight, pinching for three seconds out of every four, and the hand
/// drops out of view briefly every ten seconds.
#[derive(Debug, Clone)]
pub struct SyntheticHand {
    frame: u64,
    total_frames: u64,
    frame_ms: f64,
}

impl SyntheticHand {
    pub const PINCHED_GAP: f64 = 0.02;
    pub const OPEN_GAP: f64 = 0.12;

    pub fn new(total_frames: u64) -> Self {
        Self {
            frame: 0,
            total_frames,
            frame_ms: 1000.0 / 30.0,
        }
    }

    pub fn with_frame_ms(mut self, frame_ms: f64) -> Self {
        self.frame_ms = frame_ms;
        self
    }

    fn generate(&self, t: f64) -> Option<Hand> {
        if t % 10.0 >= 9.5 {
            return None;
        }

        let gap = if t % 4.0 < 3.0 { Self::PINCHED_GAP } else { Self::OPEN_GAP };
        let tip = [
            0.5 + 0.25 * (TAU * t / 8.0).sin(),
            0.5 + 0.15 * (TAU * t / 4.0).sin(),
            0.0,
        ];

        Hand::from_raw(&pose(tip, gap)).ok()
    }
}

/// Plausible hand pose around a given index fingertip, thumb tip `gap` to its right.
fn pose(index_tip: [f64; 3], gap: f64) -> Vec<[f64; 3]> {
    let wrist = [index_tip[0] + 0.05, index_tip[1] + 0.25, 0.0];
    let tips = [
        [index_tip[0] + gap, index_tip[1], 0.0],
        index_tip,
        [index_tip[0] + 0.04, index_tip[1] + 0.03, 0.0],
        [index_tip[0] + 0.08, index_tip[1] + 0.07, 0.0],
        [index_tip[0] + 0.11, index_tip[1] + 0.12, 0.0],
    ];

    let along = |tip: &[f64; 3], f: f64| -> [f64; 3] {
        [
            wrist[0] + (tip[0] - wrist[0]) * f,
            wrist[1] + (tip[1] - wrist[1]) * f,
            wrist[2] + (tip[2] - wrist[2]) * f,
        ]
    };

    let mut points = vec![wrist; HAND_LANDMARK_COUNT];
    for (finger, tip) in tips.iter().enumerate() {
        let base = landmarks::THUMB_CMC + finger * 4;
        let joints = if finger == 0 { [0.25, 0.5, 0.75] } else { [0.45, 0.65, 0.82] };
        for (j, f) in joints.iter().enumerate() {
            points[base + j] = along(tip, *f);
        }
        points[base + 3] = *tip;
    }
    points
}

/// A stream of tracker frames, consumed strictly in order.
pub enum FrameSource {
    Recording(RecordingReader),
    Synthetic(SyntheticHand),
}

impl FrameSource {
    pub fn from_recording(recording: Recording) -> Self {
        FrameSource::Recording(RecordingReader {
            frames: recording.frames.into_iter(),
        })
    }

    pub fn synthetic(total_frames: u64) -> Self {
        FrameSource::Synthetic(SyntheticHand::new(total_frames))
    }

    /// Frames whose hand failed validation come through at their own timestamp with no hand.
    pub fn drop_invalid_hands(self) -> impl Iterator<Item = SourceFrame> {
        self.map(or_empty)
    }
}

fn or_empty(frame: Result<SourceFrame, FrameError>) -> SourceFrame {
    frame.unwrap_or_else(|e| {
        warn!(timestamp_ms = e.timestamp_ms, error = %e.source, "invalid hand treated as no hand");
        SourceFrame {
            timestamp_ms: e.timestamp_ms,
            hand: None,
        }
    })
}

impl Iterator for FrameSource {
    type Item = Result<SourceFrame, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            FrameSource::Recording(reader) => {
                let frame = reader.frames.next()?;
                let hand = match frame.hand {
                    Some(raw) => match Hand::from_raw(&raw) {
                        Ok(hand) => Some(hand),
                        Err(source) => {
                            return Some(Err(FrameError {
                                timestamp_ms: frame.timestamp_ms,
                                source,
                            }))
                        }
                    },
                    None => None,
                };
                Some(Ok(SourceFrame {
                    timestamp_ms: frame.timestamp_ms,
                    hand,
                }))
            }
            FrameSource::Synthetic(sim) => {
                if sim.frame >= sim.total_frames {
                    return None;
                }
                let timestamp_ms = sim.frame as f64 * sim.frame_ms;
                let hand = sim.generate(timestamp_ms / 1000.0);
                sim.frame += 1;
                Some(Ok(SourceFrame { timestamp_ms, hand }))
            }
        }
    }
}
