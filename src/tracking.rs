// src/tracking.rs - Validated hand landmarks as delivered by the tracker
use serde::{Deserialize, Serialize};

use crate::error::LandmarkError;
use crate::geometry::{self, CanvasPoint, Landmark};

/// Landmark indices of the 21-point hand topology.
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

pub const HAND_LANDMARK_COUNT: usize = 21;

/// Bones drawn for the skeleton overlay: five fingers plus the knuckle line.
pub const HAND_CONNECTIONS: [(usize, usize); 23] = {
    use landmarks::*;
    [
        (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
        (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
        (WRIST, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
        (WRIST, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
        (WRIST, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
        (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, RING_MCP), (RING_MCP, PINKY_MCP),
    ]
};

/// One tracked hand. Construction rejects anything but 21 finite landmarks,
/// so downstream filters can trust every coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 3]>", into = "Vec<[f64; 3]>")]
pub struct Hand {
    landmarks: [Landmark; HAND_LANDMARK_COUNT],
}

impl Hand {
    pub fn new(points: &[Landmark]) -> Result<Self, LandmarkError> {
        if points.len() != HAND_LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount {
                expected: HAND_LANDMARK_COUNT,
                actual: points.len(),
            });
        }

        let mut landmarks = [Landmark::origin(); HAND_LANDMARK_COUNT];
        for (index, (slot, point)) in landmarks.iter_mut().zip(points).enumerate() {
            if !geometry::is_finite(point) {
                return Err(LandmarkError::NonFinite {
                    index,
                    x: point.x,
                    y: point.y,
                    z: point.z,
                });
            }
            *slot = *point;
        }

        Ok(Self { landmarks })
    }

    /// Build from raw `[x, y, z]` triples as the tracker emits them.
    pub fn from_raw(raw: &[[f64; 3]]) -> Result<Self, LandmarkError> {
        let points: Vec<Landmark> = raw.iter().map(|p| Landmark::new(p[0], p[1], p[2])).collect();
        Self::new(&points)
    }

    /// Landmark by anatomical index (see [`landmarks`]), `None` past the last one.
    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn thumb_tip(&self) -> &Landmark {
        &self.landmarks[landmarks::THUMB_TIP]
    }

    pub fn index_tip(&self) -> &Landmark {
        &self.landmarks[landmarks::INDEX_TIP]
    }

    /// The drawing cursor: index fingertip in mirrored canvas space.
    pub fn index_tip_on_canvas(&self, width: f64, height: f64) -> CanvasPoint {
        geometry::mirror_to_canvas(self.index_tip(), width, height)
    }

    pub fn project(&self, width: f64, height: f64) -> Vec<CanvasPoint> {
        self.landmarks
            .iter()
            .map(|lm| geometry::mirror_to_canvas(lm, width, height))
            .collect()
    }
}

impl TryFrom<Vec<[f64; 3]>> for Hand {
    type Error = LandmarkError;

    fn try_from(raw: Vec<[f64; 3]>) -> Result<Self, Self::Error> {
        Self::from_raw(&raw)
    }
}

impl From<Hand> for Vec<[f64; 3]> {
    fn from(hand: Hand) -> Self {
        hand.landmarks.iter().map(|p| [p.x, p.y, p.z]).collect()
    }
}
