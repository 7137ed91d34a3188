//! Parser for ffmpeg's `-progress` key/value stream

use std::time::Duration;

use crate::domain::model::ProgressSnapshot;

/// Accumulates `key=value` lines and yields a snapshot per `progress=` line
#[derive(Debug, Default)]
pub struct ProgressParser {
    duration: Option<Duration>,
    out_time_us: Option<u64>,
    out_time: Option<String>,
    fps: Option<f64>,
    kbps: Option<f64>,
    total_size: Option<u64>,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total source duration, used to compute percent
    pub fn set_duration(&mut self, duration: Duration) {
        if !duration.is_zero() {
            self.duration = Some(duration);
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Feed one stdout line; returns a snapshot at the end of each block
    pub fn feed_line(&mut self, line: &str) -> Option<ProgressSnapshot> {
        let (key, value) = line.trim().split_once('=')?;
        let value = value.trim();

        match key {
            "out_time_us" | "out_time_ms" => {
                // Both keys carry microseconds
                if let Ok(us) = value.parse::<u64>() {
                    self.out_time_us = Some(us);
                }
            }
            "out_time" => self.out_time = Some(value.to_string()),
            "fps" => self.fps = value.parse::<f64>().ok(),
            "bitrate" => {
                self.kbps = value
                    .trim_end_matches("kbits/s")
                    .trim()
                    .parse::<f64>()
                    .ok()
            }
            "total_size" => self.total_size = value.parse::<u64>().ok(),
            "progress" => return Some(self.snapshot()),
            _ => {}
        }
        None
    }

    fn snapshot(&self) -> ProgressSnapshot {
        let percent = match (self.out_time_us, self.duration) {
            (Some(us), Some(total)) => {
                let done = us as f64 / 1_000_000.0;
                Some((done / total.as_secs_f64() * 100.0).clamp(0.0, 100.0))
            }
            _ => None,
        };

        ProgressSnapshot {
            percent,
            current_fps: self.fps,
            current_kbps: self.kbps,
            target_size_kb: self.total_size.map(|bytes| bytes / 1024),
            timemark: self
                .out_time
                .as_deref()
                .map(trim_timemark)
                .or_else(|| self.out_time_us.map(format_timemark))
                .unwrap_or_default(),
        }
    }
}

/// Parse the `Duration: HH:MM:SS.ss` banner line ffmpeg prints on stderr
pub fn parse_duration_line(line: &str) -> Option<Duration> {
    let rest = line.trim().strip_prefix("Duration:")?;
    let stamp = rest.split(',').next()?.trim();
    parse_timestamp(stamp)
}

/// Parse `HH:MM:SS(.fraction)`
pub fn parse_timestamp(stamp: &str) -> Option<Duration> {
    let mut parts = stamp.split(':');
    let hours = parts.next()?.parse::<u64>().ok()?;
    let minutes = parts.next()?.parse::<u64>().ok()?;
    let seconds = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() || !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(Duration::from_secs(hours * 3600 + minutes * 60) + Duration::from_secs_f64(seconds))
}

/// `00:00:05.000000` becomes `00:00:05.00`
fn trim_timemark(stamp: &str) -> String {
    match stamp.split_once('.') {
        Some((whole, fraction)) => {
            let centis: String = fraction.chars().take(2).collect();
            format!("{}.{:0<2}", whole, centis)
        }
        None => stamp.to_string(),
    }
}

fn format_timemark(us: u64) -> String {
    let total_centis = us / 10_000;
    let centis = total_centis % 100;
    let total_secs = total_centis / 100;
    format!(
        "{:02}:{:02}:{:02}.{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60,
        centis
    )
}
