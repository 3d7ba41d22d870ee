// crates/core/src/progress.rs
//! Progress normalizer.
//!
//! The engine reports progress as loosely-typed dictionaries (yt-dlp's
//! progress hook payload). [`normalize`] turns one of those into a
//! [`StatusUpdate`]. Bad fields never fail the job: a percentage that cannot
//! be parsed becomes 0 and a missing speed or ETA becomes an empty label.

use std::sync::OnceLock;

use regex_lite::Regex;
use serde::Deserialize;

use crate::status::{clamp_percent, StatusUpdate, UNKNOWN_ERROR};

/// One progress report from the engine. Field names follow yt-dlp's progress
/// hook so a `%(progress)j` line deserializes directly.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawProgressEvent {
    #[serde(rename = "status", default)]
    pub tag: String,
    pub downloaded_bytes: Option<f64>,
    pub total_bytes: Option<f64>,
    pub total_bytes_estimate: Option<f64>,
    #[serde(rename = "_percent_str")]
    pub percent_str: Option<String>,
    #[serde(rename = "_speed_str")]
    pub speed_str: Option<String>,
    /// Bytes per second.
    pub speed: Option<f64>,
    #[serde(rename = "_eta_str")]
    pub eta_str: Option<String>,
    /// Seconds remaining.
    pub eta: Option<f64>,
    pub filename: Option<String>,
    pub error: Option<String>,
}

impl RawProgressEvent {
    pub fn downloading(downloaded: u64, total: u64) -> Self {
        Self {
            tag: "downloading".into(),
            downloaded_bytes: Some(downloaded as f64),
            total_bytes: Some(total as f64),
            ..Self::default()
        }
    }

    pub fn finished(filename: impl Into<String>) -> Self {
        Self {
            tag: "finished".into(),
            filename: Some(filename.into()),
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            tag: "error".into(),
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Map a raw engine event onto a status update. Unknown tags yield `None`.
pub fn normalize(event: &RawProgressEvent) -> Option<StatusUpdate> {
    match event.tag.as_str() {
        "downloading" => Some(StatusUpdate::Downloading {
            percent: percent_of(event),
            speed_label: speed_label(event),
            eta_label: eta_label(event),
            file_name: base_name(event.filename.as_deref()),
        }),
        "finished" => Some(StatusUpdate::Merging {
            file_name: base_name(event.filename.as_deref()),
        }),
        "error" => Some(StatusUpdate::Failed {
            message: event
                .error
                .clone()
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        }),
        other => {
            tracing::trace!(tag = other, "ignoring progress event with unrecognized tag");
            None
        }
    }
}

/// Byte ratio when both counters are usable, else the pre-formatted string.
fn percent_of(event: &RawProgressEvent) -> f64 {
    let total = event
        .total_bytes
        .filter(|t| *t > 0.0)
        .or(event.total_bytes_estimate.filter(|t| *t > 0.0));

    match (event.downloaded_bytes, total) {
        (Some(downloaded), Some(total)) => clamp_percent(round1(downloaded / total * 100.0)),
        _ => parse_percent(event.percent_str.as_deref().unwrap_or("")),
    }
}

/// Parse strings like `" 42.3%"` or `"\x1b[0;94m 42.3%\x1b[0m"`; anything
/// unparseable is 0.
pub fn parse_percent(raw: &str) -> f64 {
    let cleaned = strip_ansi(raw);
    let number = cleaned.trim().trim_end_matches('%').trim();
    match number.parse::<f64>() {
        Ok(value) => clamp_percent(value),
        Err(_) => {
            if !number.is_empty() {
                tracing::trace!(raw = %number, "unparseable percent string");
            }
            0.0
        }
    }
}

fn speed_label(event: &RawProgressEvent) -> String {
    if let Some(label) = preformatted(event.speed_str.as_deref()) {
        return label;
    }
    match event.speed.filter(|s| s.is_finite() && *s > 0.0) {
        Some(bytes_per_sec) => format_speed(bytes_per_sec),
        None => String::new(),
    }
}

fn eta_label(event: &RawProgressEvent) -> String {
    if let Some(label) = preformatted(event.eta_str.as_deref()) {
        return label;
    }
    match event.eta.filter(|e| e.is_finite() && *e > 0.0) {
        Some(secs) => format_eta(secs as u64),
        None => String::new(),
    }
}

/// A cleaned pre-formatted label, unless it is empty or a sentinel.
fn preformatted(raw: Option<&str>) -> Option<String> {
    let cleaned = strip_ansi(raw?);
    let label = cleaned.trim();
    if label.is_empty() || is_unknown(label) {
        None
    } else {
        Some(label.to_string())
    }
}

fn is_unknown(label: &str) -> bool {
    let lower = label.to_ascii_lowercase();
    lower.starts_with("unknown") || lower == "na" || lower == "n/a"
}

/// Bytes/sec → `"2.4 MiB/s"`.
pub fn format_speed(bytes_per_sec: f64) -> String {
    format!("{:.1} MiB/s", bytes_per_sec / 1024.0 / 1024.0)
}

/// Seconds → `"3m 7s"`, or `"42s"` under a minute.
pub fn format_eta(secs: u64) -> String {
    let (minutes, seconds) = (secs / 60, secs % 60);
    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Last path segment, accepting both separators since the engine may report
/// Windows paths.
pub fn base_name(path: Option<&str>) -> String {
    path.and_then(|p| p.rsplit(['/', '\\']).next())
        .unwrap_or("")
        .to_string()
}

/// Remove ANSI colour sequences (`ESC [ ... m`) the engine embeds in its
/// pre-formatted strings.
pub fn strip_ansi(text: &str) -> String {
    static ANSI: OnceLock<Option<Regex>> = OnceLock::new();
    match ANSI.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").ok()) {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
