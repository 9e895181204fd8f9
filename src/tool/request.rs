//! Invocation and response types for the external tool

use std::time::Duration;

/// One command-line invocation of the external tool.
///
/// Options keep their insertion order; the target URL is always passed last.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRequest {
    url: String,
    options: Vec<(String, Option<String>)>,
}

impl ToolRequest {
    /// Create a request for a target URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            options: Vec::new(),
        }
    }

    /// Add an option that takes a value (e.g. `-f best`)
    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((name.into(), Some(value.into())));
        self
    }

    /// Add a bare flag (e.g. `--newline`)
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.options.push((name.into(), None));
        self
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Value of the first occurrence of an option
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Check if a flag or option is present
    pub fn has(&self, name: &str) -> bool {
        self.options.iter().any(|(key, _)| key == name)
    }

    /// Build the argument vector passed to the process
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.options.len() * 2 + 1);
        for (name, value) in &self.options {
            args.push(name.clone());
            if let Some(value) = value {
                args.push(value.clone());
            }
        }
        args.push(self.url.clone());
        args
    }
}

/// Result of a completed tool invocation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolResponse {
    /// Process exit status (-1 when terminated by a signal)
    pub exit_code: i32,
    /// Captured standard output
    pub out: String,
    /// Captured standard error
    pub err: String,
    /// Wall-clock time of the invocation
    pub elapsed: Duration,
}

impl ToolResponse {
    /// Check if the process exited cleanly
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// `ERROR:` lines reported on standard error, if any
    pub fn error_text(&self) -> Option<String> {
        let lines: Vec<&str> = self
            .err
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("ERROR:"))
            .collect();

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_keeps_order_and_url_last() {
        let request = ToolRequest::new("https://example.com/v")
            .option("-o", "/tmp/%(title)s.%(ext)s")
            .flag("--restrict-filenames")
            .option("-f", "worst");

        assert_eq!(
            request.build_args(),
            vec![
                "-o",
                "/tmp/%(title)s.%(ext)s",
                "--restrict-filenames",
                "-f",
                "worst",
                "https://example.com/v"
            ]
        );
    }

    #[test]
    fn test_value_lookup() {
        let request = ToolRequest::new("u").option("-f", "best").flag("--newline");
        assert_eq!(request.value_of("-f"), Some("best"));
        assert_eq!(request.value_of("--newline"), None);
        assert!(request.has("--newline"));
        assert!(!request.has("--no-warnings"));
        assert_eq!(request.url(), "u");
    }

    #[test]
    fn test_error_text() {
        let response = ToolResponse {
            exit_code: 1,
            err: "WARNING: something\nERROR: [youtube] abc: Private video\n".to_string(),
            ..Default::default()
        };
        assert_eq!(
            response.error_text().as_deref(),
            Some("ERROR: [youtube] abc: Private video")
        );
        assert!(!response.is_success());

        let response = ToolResponse {
            exit_code: 2,
            err: "usage: yt-dlp [OPTIONS] URL".to_string(),
            ..Default::default()
        };
        assert_eq!(response.error_text(), None);
    }
}
