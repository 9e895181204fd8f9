//! Progress parsing for external tool output

use regex::Regex;
use std::sync::OnceLock;

/// Progress information reported by the external tool
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Download progress as a percentage (0.0 to 100.0)
    pub percent: f32,
    /// Total size as printed by the tool (e.g. "150.00MiB")
    pub total_size: Option<String>,
    /// Current speed as printed by the tool (e.g. "5.50MiB/s")
    pub speed: Option<String>,
    /// Estimated time remaining as printed by the tool (e.g. "00:15")
    pub eta: Option<String>,
}

impl Progress {
    /// Create a progress value with only a percentage
    pub fn new(percent: f32) -> Self {
        Self {
            percent: percent.clamp(0.0, 100.0),
            total_size: None,
            speed: None,
            eta: None,
        }
    }

    /// Check if download is complete
    pub fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }
}

fn full_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[download\]\s+(\d+(?:\.\d+)?)%\s+of\s+~?\s*(\S+)(?:\s+in\s+\S+)?(?:\s+at\s+(\S+))?(?:\s+ETA\s+(\S+))?")
            .expect("valid progress regex")
    })
}

fn percent_only_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[download\]\s+(\d+(?:\.\d+)?)%").expect("valid percent regex"))
}

/// Parse one `--newline` progress line from the tool.
///
/// Recognises `[download]  45.2% of ~150.00MiB at 5.50MiB/s ETA 00:15`
/// and the shorter `[download] 100%` form. Other lines yield `None`.
pub fn parse_progress_line(line: &str) -> Option<Progress> {
    let line = line.trim();

    if let Some(caps) = full_line_regex().captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        let keep = |s: &str| -> Option<String> {
            if s.is_empty() || s.starts_with("Unknown") || s == "N/A" {
                None
            } else {
                Some(s.to_string())
            }
        };
        return Some(Progress {
            percent: percent.clamp(0.0, 100.0),
            total_size: caps.get(2).and_then(|m| keep(m.as_str())),
            speed: caps.get(3).and_then(|m| keep(m.as_str())),
            eta: caps.get(4).and_then(|m| keep(m.as_str())),
        });
    }

    let caps = percent_only_regex().captures(line)?;
    let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
    Some(Progress::new(percent))
}
