//! Boundary to the extraction collaborator (`yt-dlp`).

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::ExtractionError;
use crate::models::RawExtraction;

static YTDLP_ERROR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^ERROR:\s*(?P<message>.+?)\s*$").expect("static regex is valid")
});

/// Per-request extraction settings. Built fresh for every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Let yt-dlp fetch its remote challenge solver components.
    pub enable_remote: bool,
    pub timeout: Duration,
}

/// Produces the raw format list and metadata for a video page URL.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &str, options: &ExtractOptions) -> Result<RawExtraction, ExtractionError>;
}

/// Runs `yt-dlp --dump-json` as a child process.
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    binary: String,
}

impl YtDlpExtractor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    fn command(&self, url: &str, options: &ExtractOptions) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--dump-json")
            .arg("--skip-download")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--socket-timeout")
            .arg("5");
        if options.enable_remote {
            cmd.arg("--remote-components").arg("ejs:github");
        }
        cmd.arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    async fn extract(&self, url: &str, options: &ExtractOptions) -> Result<RawExtraction, ExtractionError> {
        let child = self.command(url, options).spawn().map_err(ExtractionError::Spawn)?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(options.timeout, child.wait_with_output())
            .await
            .map_err(|_| ExtractionError::Timeout(options.timeout))?
            .map_err(ExtractionError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!("yt-dlp failed for {}: {}", url, stderr.trim());
            return Err(ExtractionError::Failed(failure_message(&stderr, output.status)));
        }

        let info: RawExtraction = serde_json::from_slice(&output.stdout)?;
        Ok(info)
    }
}

/// Picks the first `ERROR:` line out of yt-dlp's stderr.
fn failure_message(stderr: &str, status: std::process::ExitStatus) -> String {
    if let Some(caps) = YTDLP_ERROR_REGEX.captures(stderr) {
        return caps["message"].to_string();
    }
    match stderr.trim() {
        "" => format!("yt-dlp exited with {}", status),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn options(enable_remote: bool) -> ExtractOptions {
        ExtractOptions { enable_remote, timeout: Duration::from_secs(10) }
    }

    #[test]
    fn remote_components_follow_the_request_flag() {
        let extractor = YtDlpExtractor::new("yt-dlp");

        let with_remote = args(&extractor.command("https://youtu.be/x", &options(true)));
        assert!(with_remote.windows(2).any(|w| w[0] == "--remote-components" && w[1] == "ejs:github"));
        assert_eq!(with_remote.last().map(String::as_str), Some("https://youtu.be/x"));

        let without = args(&extractor.command("https://youtu.be/x", &options(false)));
        assert!(!without.iter().any(|a| a == "--remote-components"));
        assert!(without.iter().any(|a| a == "--dump-json"));
    }

    #[cfg(unix)]
    #[test]
    fn failure_message_prefers_error_line() {
        use std::os::unix::process::ExitStatusExt;
        let status = std::process::ExitStatus::from_raw(256);

        let stderr = "[youtube] abc: Downloading webpage\nERROR: [youtube] abc: Video unavailable\n";
        assert_eq!(failure_message(stderr, status), "[youtube] abc: Video unavailable");
        assert_eq!(failure_message("  boom \n", status), "boom");
        assert!(failure_message("", status).starts_with("yt-dlp exited with"));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let extractor = YtDlpExtractor::new("/nonexistent/yt-dlp-binary");
        let result = extractor.extract("https://youtu.be/x", &options(false)).await;
        assert!(matches!(result, Err(ExtractionError::Spawn(_))));
    }
}
