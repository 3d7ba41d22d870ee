// crates/server/src/config.rs
//! Command-line and environment configuration for the `vidgrab` binary.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

/// Where a static ffmpeg build is commonly unpacked on hosted sandboxes.
pub const BUNDLED_FFMPEG: &str = "/tmp/ffmpeg/ffmpeg";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Local web front-end for yt-dlp", long_about = None)]
pub struct Config {
    /// Interface to bind.
    #[arg(long, env = "VIDGRAB_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Directory finished downloads are written to. Created if missing.
    #[arg(long, env = "VIDGRAB_DOWNLOAD_DIR", default_value = "downloads")]
    pub download_dir: PathBuf,

    /// yt-dlp executable.
    #[arg(long, env = "VIDGRAB_YTDLP", default_value = "yt-dlp")]
    pub ytdlp: PathBuf,

    /// Extra argument placed before everything else on the yt-dlp command
    /// line. Repeatable.
    #[arg(long = "ytdlp-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub ytdlp_args: Vec<String>,

    /// ffmpeg executable handed to yt-dlp for merging.
    #[arg(long, env = "VIDGRAB_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// How often each `/progress` stream samples the job status.
    #[arg(long, default_value_t = 300)]
    pub poll_interval_ms: u64,

    /// Open the page in the default browser once listening.
    #[arg(long, default_value_t = false)]
    pub open: bool,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Explicit `--ffmpeg`, else the bundled build if present, else `ffmpeg`
    /// from `PATH`.
    pub fn ffmpeg_location(&self) -> PathBuf {
        resolve_ffmpeg(self.ffmpeg.as_deref(), Path::new(BUNDLED_FFMPEG))
    }

    /// URL the page is served at, for the banner and `--open`.
    pub fn page_url(&self) -> String {
        let host = if self.host.is_unspecified() {
            "127.0.0.1".to_string()
        } else {
            self.host.to_string()
        };
        match self.host {
            IpAddr::V6(_) if !self.host.is_unspecified() => {
                format!("http://[{host}]:{}/", self.port)
            }
            _ => format!("http://{host}:{}/", self.port),
        }
    }
}

fn resolve_ffmpeg(explicit: Option<&Path>, bundled: &Path) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None if bundled.exists() => bundled.to_path_buf(),
        None => PathBuf::from("ffmpeg"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let argv = std::iter::once("vidgrab").chain(args.iter().copied());
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_explicit_args() {
        let config = parse(&[
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--download-dir",
            "/srv/media",
            "--ytdlp",
            "/opt/yt-dlp",
            "--ffmpeg",
            "/opt/ffmpeg",
            "--poll-interval-ms",
            "50",
            "--open",
        ]);
        assert_eq!(config.addr(), "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.download_dir, PathBuf::from("/srv/media"));
        assert_eq!(config.ytdlp, PathBuf::from("/opt/yt-dlp"));
        assert_eq!(config.ffmpeg_location(), PathBuf::from("/opt/ffmpeg"));
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert!(config.open);
        assert_eq!(config.page_url(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_repeated_ytdlp_args_keep_order() {
        let config = parse(&[
            "--ytdlp-arg",
            "--cookies",
            "--ytdlp-arg",
            "cookies.txt",
        ]);
        assert_eq!(config.ytdlp_args, vec!["--cookies", "cookies.txt"]);
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let config = parse(&["--poll-interval-ms", "0"]);
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_ipv6_page_url() {
        let config = parse(&["--host", "::1", "--port", "5000"]);
        assert_eq!(config.page_url(), "http://[::1]:5000/");
    }

    #[test]
    fn test_resolve_ffmpeg_prefers_explicit_then_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = dir.path().join("ffmpeg");

        assert_eq!(resolve_ffmpeg(None, &bundled), PathBuf::from("ffmpeg"));

        std::fs::write(&bundled, b"").unwrap();
        assert_eq!(resolve_ffmpeg(None, &bundled), bundled);
        assert_eq!(
            resolve_ffmpeg(Some(Path::new("/usr/bin/ffmpeg")), &bundled),
            PathBuf::from("/usr/bin/ffmpeg")
        );
    }

    #[test]
    fn test_rejects_bad_port() {
        let argv = ["vidgrab", "--port", "not-a-port"];
        assert!(Config::try_parse_from(argv).is_err());
    }
}
