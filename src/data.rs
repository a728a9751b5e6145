// src/data.rs - Per-frame trace CSV and an HTML summary for a drawing session
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::geometry::{self, CanvasPoint};
use crate::gesture::PinchState;
use crate::session::{FrameOutput, SessionStats};
use crate::smoothing::smooth_path;
use crate::stroke::SegmentKind;

#[derive(Debug, Clone, Serialize)]
struct TraceRecord {
    frame: u64,
    timestamp_ms: f64,
    hand_present: bool,
    pinch: PinchState,
    stroke_started: bool,
    cursor_x: Option<f64>,
    cursor_y: Option<f64>,
    smoothed_x: Option<f64>,
    smoothed_y: Option<f64>,
    direct_segments: usize,
    interpolated_segments: usize,
}

pub struct SessionExporter {
    output_dir: PathBuf,
    session_name: String,
    records: Vec<TraceRecord>,
}

impl SessionExporter {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            records: Vec::new(),
        }
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn frame_count(&self) -> usize {
        self.records.len()
    }

    pub fn add_frame(&mut self, output: &FrameOutput, timestamp_ms: f64) {
        let (mut direct, mut interpolated) = (0, 0);
        for segment in output.segments() {
            match segment.kind {
                SegmentKind::Direct => direct += 1,
                SegmentKind::Interpolated => interpolated += 1,
            }
        }

        self.records.push(TraceRecord {
            frame: self.records.len() as u64,
            timestamp_ms,
            hand_present: output.hand_present,
            pinch: output.pinch,
            stroke_started: output.stroke_started,
            cursor_x: output.cursor.map(|p| p.x),
            cursor_y: output.cursor.map(|p| p.y),
            smoothed_x: output.smoothed.map(|p| p.x),
            smoothed_y: output.smoothed.map(|p| p.y),
            direct_segments: direct,
            interpolated_segments: interpolated,
        });
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self.session_dir().join("trace.csv");
        ensure_parent(&csv_path)?;

        let file = File::create(&csv_path)
            .with_context(|| format!("Failed to create {}", csv_path.display()))?;
        let mut writer = Writer::from_writer(file);
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!(path = %csv_path.display(), frames = self.records.len(), "trace exported");
        Ok(csv_path)
    }

    pub fn generate_report(&self, stats: &SessionStats) -> Result<PathBuf> {
        let report_path = self.session_dir().join("report.html");
        ensure_parent(&report_path)?;

        std::fs::write(&report_path, self.create_html_report(stats))
            .with_context(|| format!("Failed to write {}", report_path.display()))?;

        info!(path = %report_path.display(), "report written");
        Ok(report_path)
    }

    /// Total length of the drawn strokes in pixels, each stroke's smoothed
    /// cursor path relaxed with [`smooth_path`] first.
    pub fn ink_length(&self) -> f64 {
        let mut total = 0.0;
        let mut stroke: Vec<CanvasPoint> = Vec::new();
        for record in &self.records {
            match (record.smoothed_x, record.smoothed_y) {
                (Some(x), Some(y)) => {
                    if record.stroke_started {
                        total += path_length(&smooth_path(&std::mem::take(&mut stroke)));
                    }
                    stroke.push(CanvasPoint::new(x, y));
                }
                _ => total += path_length(&smooth_path(&std::mem::take(&mut stroke))),
            }
        }
        total + path_length(&smooth_path(&stroke))
    }

    fn create_html_report(&self, stats: &SessionStats) -> String {
        let pinched_frames = self
            .records
            .iter()
            .filter(|r| r.pinch == PinchState::Down)
            .count();
        let detection_rate = percentage(stats.frames_with_hand, stats.frames);
        let pinch_rate = percentage(pinched_frames as u64, stats.frames_with_hand);
        let duration_s = match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => (last.timestamp_ms - first.timestamp_ms) / 1000.0,
            _ => 0.0,
        };

        format!(r#"
<!DOCTYPE html>
<html>
<head>
    <title>Air Writing Report - {name}</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 40px; background: #f5f5f5; }}
        h1 {{ color: #333; }}
        .stats {{ background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        .stat-item {{ margin: 10px 0; }}
        .stat-label {{ font-weight: bold; color: #666; }}
        .stat-value {{ color: #667eea; font-size: 1.2em; }}
    </style>
</head>
<body>
    <h1>Air Writing Session Report</h1>
    <div class="stats">
        <h2>Session: {name}</h2>
        <div class="stat-item">
            <span class="stat-label">Frames:</span>
            <span class="stat-value">{frames} ({duration:.1} s)</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Hand Detection Rate:</span>
            <span class="stat-value">{detection:.1}%</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Pinched (of tracked frames):</span>
            <span class="stat-value">{pinch:.1}%</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Strokes:</span>
            <span class="stat-value">{strokes}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Segments:</span>
            <span class="stat-value">{segments} ({interpolated} interpolated)</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Ink Length:</span>
            <span class="stat-value">{ink:.0} px</span>
        </div>
    </div>
</body>
</html>
"#,
            name = self.session_name,
            frames = stats.frames,
            duration = duration_s,
            detection = detection_rate,
            pinch = pinch_rate,
            strokes = stats.strokes,
            segments = stats.segments,
            interpolated = stats.interpolated_segments,
            ink = self.ink_length(),
        )
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn path_length(points: &[CanvasPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| geometry::distance_2d(&w[0], &w[1]))
        .sum()
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_name_is_timestamped() {
        let exporter = SessionExporter::new("out", None);
        assert!(exporter.session_name().starts_with("session_"));
        assert_eq!(exporter.session_dir(), Path::new("out").join(exporter.session_name()));
    }

    #[test]
    fn percentages_handle_empty_sessions() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }

    fn output(smoothed: Option<(f64, f64)>, stroke_started: bool) -> FrameOutput {
        FrameOutput {
            commands: Vec::new(),
            pinch: if smoothed.is_some() { PinchState::Down } else { PinchState::Up },
            hand_present: true,
            cursor: None,
            smoothed: smoothed.map(|(x, y)| CanvasPoint::new(x, y)),
            stroke_started,
        }
    }

    #[test]
    fn ink_length_follows_each_stroke() {
        let mut exporter = SessionExporter::new("out", Some("ink".into()));
        let frames = [
            (Some((0.0, 0.0)), true),
            (Some((10.0, 0.0)), false),
            (Some((20.0, 0.0)), false),
            (None, false),
            (Some((100.0, 100.0)), true),
            (Some((100.0, 105.0)), false),
            // New stroke right away, no gap in between.
            (Some((300.0, 300.0)), true),
        ];
        for (i, (smoothed, started)) in frames.into_iter().enumerate() {
            exporter.add_frame(&output(smoothed, started), i as f64 * 33.0);
        }
        assert_eq!(exporter.ink_length(), 25.0);

        let stats = SessionStats::default();
        assert!(exporter.create_html_report(&stats).contains("25 px"));
    }

    #[test]
    fn relaxed_zigzag_is_shorter() {
        let mut exporter = SessionExporter::new("out", Some("zigzag".into()));
        let zigzag = [(0.0, 0.0), (10.0, 10.0), (20.0, 0.0), (30.0, 10.0), (40.0, 0.0)];
        for (i, p) in zigzag.into_iter().enumerate() {
            exporter.add_frame(&output(Some(p), i == 0), i as f64 * 33.0);
        }
        let raw = 4.0 * 200.0_f64.sqrt();
        assert!(exporter.ink_length() < raw);
        assert!(exporter.ink_length() >= 40.0);
    }

    #[test]
    fn report_mentions_counts() {
        let exporter = SessionExporter::new("out", Some("demo".into()));
        let stats = SessionStats {
            frames: 10,
            frames_with_hand: 8,
            strokes: 2,
            segments: 14,
            interpolated_segments: 4,
        };
        let html = exporter.create_html_report(&stats);
        assert!(html.contains("Session: demo"));
        assert!(html.contains("80.0%"));
        assert!(html.contains("14 (4 interpolated)"));
    }
}
