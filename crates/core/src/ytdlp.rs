// crates/core/src/ytdlp.rs
//! yt-dlp engine: spawns the `yt-dlp` binary and turns its progress output
//! into [`RawProgressEvent`]s.
//!
//! Progress is requested through `--progress-template` as one JSON object per
//! line (`%(progress)j`), prefixed with a marker so it can be told apart from
//! anything else yt-dlp prints. Errors arrive on stderr as `ERROR: ...`.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;

use crate::engine::{EventSink, FetchRequest, MediaEngine};
use crate::error::EngineError;
use crate::progress::{strip_ansi, RawProgressEvent};

/// Marker in front of every progress line we ask yt-dlp to print.
pub const PROGRESS_MARKER: &str = "VIDGRAB_PROGRESS ";

/// Engine backed by the yt-dlp command line.
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    program: PathBuf,
    base_args: Vec<OsString>,
    ffmpeg_location: Option<PathBuf>,
}

impl YtDlpEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            ffmpeg_location: None,
        }
    }

    /// Arguments placed before the generated ones, e.g. `-m yt_dlp` when
    /// `program` is a Python interpreter.
    pub fn with_base_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// ffmpeg binary (or its directory) used for merging streams.
    pub fn with_ffmpeg(mut self, location: impl Into<PathBuf>) -> Self {
        self.ffmpeg_location = Some(location.into());
        self
    }

    /// Full argument list for one download.
    pub fn args(&self, request: &FetchRequest) -> Vec<OsString> {
        let mut args = self.base_args.clone();
        args.extend(
            [
                "--newline",
                "--quiet",
                "--progress",
                "--no-warnings",
                "--no-playlist",
                "--restrict-filenames",
                "--progress-template",
            ]
            .map(OsString::from),
        );
        args.push(format!("download:{PROGRESS_MARKER}%(progress)j").into());
        args.push("-f".into());
        args.push(request.format_selector.clone().into());
        args.push("--merge-output-format".into());
        args.push(request.merge_format.clone().into());
        args.push("-o".into());
        args.push(request.output_path().into_os_string());
        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.clone().into_os_string());
        }
        // Keeps a target starting with '-' from being read as an option.
        args.push("--".into());
        args.push(request.target.clone().into());
        args
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    async fn fetch(&self, request: FetchRequest, events: EventSink) -> Result<(), EngineError> {
        let program = self.program_name();
        tracing::info!(
            program = %program,
            target = %request.target,
            format = %request.format_selector,
            output = %request.output_path().display(),
            "yt-dlp: spawning"
        );

        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(self.args(&request))
            .env("PYTHONIOENCODING", "UTF-8")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| {
            tracing::error!(program = %program, error = %source, "yt-dlp: failed to spawn");
            EngineError::Spawn {
                program: program.clone(),
                source,
            }
        })?;

        let stdout = child.stdout.take().ok_or_else(|| EngineError::Io {
            program: program.clone(),
            source: std::io::Error::other("stdout was not captured"),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| EngineError::Io {
            program: program.clone(),
            source: std::io::Error::other("stderr was not captured"),
        })?;

        // Drain stderr concurrently so a chatty child never blocks on a full
        // pipe; keep the last ERROR line as the failure description.
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut last_error = None;
            while let Ok(Some(line)) = lines.next_line().await {
                let line = strip_ansi(&line);
                match parse_error_line(&line) {
                    Some(message) => {
                        tracing::warn!(message = %message, "yt-dlp: reported error");
                        last_error = Some(message);
                    }
                    None if !line.trim().is_empty() => {
                        tracing::debug!(line = %line.trim(), "yt-dlp stderr");
                    }
                    None => {}
                }
            }
            last_error
        });

        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await.map_err(|source| EngineError::Io {
            program: program.clone(),
            source,
        })? {
            match parse_progress_line(&line) {
                Some(event) => {
                    // Receiver gone means nobody is tracking this job anymore;
                    // let the download finish regardless.
                    let _ = events.send(event);
                }
                None if !line.trim().is_empty() => {
                    tracing::debug!(line = %line.trim(), "yt-dlp stdout");
                }
                None => {}
            }
        }

        let status = child.wait().await.map_err(|source| EngineError::Io {
            program: program.clone(),
            source,
        })?;
        let last_error = stderr_task.await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "yt-dlp: stderr reader task failed");
            None
        });

        if status.success() {
            tracing::info!(target = %request.target, "yt-dlp: finished");
            return Ok(());
        }

        tracing::warn!(exit_code = ?status.code(), "yt-dlp: non-zero exit");
        Err(match last_error {
            Some(message) => EngineError::Reported(message),
            None => EngineError::Exited {
                program,
                status: status.to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        "yt-dlp"
    }
}

/// Decode one marked progress line; anything else is `None`.
pub fn parse_progress_line(line: &str) -> Option<RawProgressEvent> {
    let json = line.trim().strip_prefix(PROGRESS_MARKER.trim_end())?.trim();
    match serde_json::from_str(json) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!(error = %e, "yt-dlp: undecodable progress line");
            None
        }
    }
}

/// `"ERROR: [youtube] x: Video unavailable"` → `"[youtube] x: Video unavailable"`.
pub fn parse_error_line(line: &str) -> Option<String> {
    line.trim()
        .strip_prefix("ERROR:")
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
