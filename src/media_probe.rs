/*!
 * Video resolution probing.
 *
 * Asks ffprobe for the width and height of the first video stream. The
 * styled subtitle format needs the frame size for its coordinate space,
 * font size and margins; when probing fails the pipeline continues with
 * 1920x1080.
 */

use log::{debug, warn};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::RenderConfig;
use crate::errors::ProbeError;

/// Frame size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// ffprobe wrapper
#[derive(Debug, Clone)]
pub struct MediaProbe {
    ffprobe_path: String,
    timeout: Duration,
}

impl MediaProbe {
    pub fn new<S: Into<String>>(ffprobe_path: S, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(
            config.ffprobe_path.clone(),
            Duration::from_secs(config.probe_timeout_secs),
        )
    }

    /// Resolution of the first video stream
    pub async fn probe_resolution<P: AsRef<Path>>(&self, video: P) -> Result<Resolution, ProbeError> {
        let video = video.as_ref();

        let probe_future = Command::new(&self.ffprobe_path)
            .arg("-v")
            .arg("error")
            .arg("-select_streams")
            .arg("v:0")
            .arg("-show_entries")
            .arg("stream=width,height")
            .arg("-of")
            .arg("json")
            .arg(video)
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = probe_future => {
                result.map_err(|e| ProbeError::Execution(format!("{}: {}", self.ffprobe_path, e)))?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(ProbeError::Execution(format!(
                    "{} timed out after {} seconds",
                    self.ffprobe_path,
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::ToolFailed(stderr.trim().to_string()));
        }

        let resolution = parse_resolution(&String::from_utf8_lossy(&output.stdout))?;
        debug!("Probed {:?}: {}", video, resolution);
        Ok(resolution)
    }

    /// Probe, falling back to 1920x1080 with a warning
    pub async fn resolution_or_default<P: AsRef<Path>>(&self, video: P) -> Resolution {
        match self.probe_resolution(&video).await {
            Ok(resolution) => resolution,
            Err(e) => {
                let fallback = Resolution::default();
                warn!("Could not determine video resolution ({}); assuming {}", e, fallback);
                fallback
            }
        }
    }
}

/// Extract the first stream's size from ffprobe JSON output
pub fn parse_resolution(json: &str) -> Result<Resolution, ProbeError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ProbeError::Parse(e.to_string()))?;

    let stream = value
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|streams| streams.first())
        .ok_or_else(|| ProbeError::Parse("no video stream".to_string()))?;

    let dimension = |key: &str| -> Result<u32, ProbeError> {
        stream
            .get(key)
            .and_then(|v| v.as_u64())
            .filter(|v| *v > 0)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ProbeError::Parse(format!("missing or invalid {}", key)))
    };

    Ok(Resolution::new(dimension("width")?, dimension("height")?))
}
