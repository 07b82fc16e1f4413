//! Build result types.
//!
//! Contains types for representing the outcome of build operations.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::color::Rgb565;

/// Status of a single artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    /// Header written
    Success,
    /// Artifact could not be produced
    Failed(String),
}

impl BuildStatus {
    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success)
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, BuildStatus::Failed(_))
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStatus::Success => write!(f, "success"),
            BuildStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Which pipeline adapter produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// One image, one header
    Single,
    /// One character's frames, one header
    Character,
    /// One animation folder, one header for all its characters
    Folder,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Single => write!(f, "single"),
            ArtifactKind::Character => write!(f, "character"),
            ArtifactKind::Folder => write!(f, "folder"),
        }
    }
}

/// Size and frame count of one character in an animation header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterSummary {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub animations: usize,
    pub frames: usize,
}

/// Result of producing one header.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactResult {
    /// Image, character or folder name the artifact was built from
    pub source: String,
    pub kind: ArtifactKind,
    pub status: BuildStatus,
    /// Header written, if any
    pub output: Option<PathBuf>,
    /// Encoded size of a single image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<(u32, u32)>,
    /// Characters of an animation header
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub characters: Vec<CharacterSummary>,
    pub key: Option<Rgb565>,
    /// Warning messages (if any)
    pub warnings: Vec<String>,
}

impl ArtifactResult {
    /// Create a successful result.
    pub fn success(source: String, kind: ArtifactKind, output: PathBuf, key: Rgb565) -> Self {
        Self {
            source,
            kind,
            status: BuildStatus::Success,
            output: Some(output),
            size: None,
            characters: vec![],
            key: Some(key),
            warnings: vec![],
        }
    }

    /// Create a failed result.
    pub fn failed(source: String, kind: ArtifactKind, error: String) -> Self {
        Self {
            source,
            kind,
            status: BuildStatus::Failed(error),
            output: None,
            size: None,
            characters: vec![],
            key: None,
            warnings: vec![],
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn with_characters(mut self, characters: Vec<CharacterSummary>) -> Self {
        self.characters = characters;
        self
    }

    /// Add warnings to the result.
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a complete build run.
#[derive(Debug, Default, Serialize)]
pub struct BuildReport {
    /// Results for each artifact
    pub artifacts: Vec<ArtifactResult>,
    /// Files ignored because their name is not `<character> <animation> <index>`
    pub unrecognized: Vec<PathBuf>,
    /// Total build duration
    #[serde(skip)]
    pub total_duration: Duration,
}

impl BuildReport {
    /// Create a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact result.
    pub fn add_result(&mut self, result: ArtifactResult) {
        self.artifacts.push(result);
    }

    /// Append another report's entries.
    pub fn merge(&mut self, other: BuildReport) {
        self.artifacts.extend(other.artifacts);
        self.unrecognized.extend(other.unrecognized);
    }

    /// Set the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    /// Get the number of headers written.
    pub fn success_count(&self) -> usize {
        self.artifacts.iter().filter(|r| r.is_success()).count()
    }

    /// Get the number of failed artifacts.
    pub fn failed_count(&self) -> usize {
        self.artifacts.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Check if the overall build succeeded (no failures).
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get all outputs produced.
    pub fn all_outputs(&self) -> Vec<&PathBuf> {
        self.artifacts.iter().filter_map(|r| r.output.as_ref()).collect()
    }

    /// Get all warnings, prefixed with their artifact.
    pub fn all_warnings(&self) -> Vec<String> {
        self.artifacts
            .iter()
            .flat_map(|r| r.warnings.iter().map(move |w| format!("{}: {}", r.source, w)))
            .collect()
    }

    /// Get failed artifact results.
    pub fn failures(&self) -> Vec<&ArtifactResult> {
        self.artifacts.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// Format a summary of the build.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        let success = self.success_count();
        let failed = self.failed_count();
        let total = self.artifacts.len();

        if failed > 0 {
            lines.push(format!(
                "Build failed: {} written, {} failed ({} total)",
                success, failed, total
            ));
            for artifact in self.failures() {
                lines.push(format!("  - {} '{}': {}", artifact.kind, artifact.source, artifact.status));
            }
        } else {
            lines.push(format!(
                "Build succeeded: {} header(s) written in {:?}",
                success, self.total_duration
            ));
        }

        if !self.unrecognized.is_empty() {
            lines.push(format!("Skipped {} file(s) with unrecognized names", self.unrecognized.len()));
        }

        let warnings = self.all_warnings();
        if !warnings.is_empty() {
            lines.push(format!("Warnings ({}): ", warnings.len()));
            for warning in warnings.iter().take(5) {
                lines.push(format!("  - {}", warning));
            }
            if warnings.len() > 5 {
                lines.push(format!("  ... and {} more", warnings.len() - 5));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(source: &str) -> ArtifactResult {
        ArtifactResult::success(
            source.to_string(),
            ArtifactKind::Single,
            PathBuf::from(format!("{}.h", source)),
            Rgb565(0xF81F),
        )
    }

    #[test]
    fn test_build_status_display() {
        assert_eq!(BuildStatus::Success.to_string(), "success");
        assert_eq!(BuildStatus::Failed("error".to_string()).to_string(), "failed: error");
    }

    #[test]
    fn test_artifact_result_failed() {
        let result = ArtifactResult::failed(
            "hero".to_string(),
            ArtifactKind::Character,
            "inconsistent frame size".to_string(),
        );
        assert!(!result.is_success());
        assert!(result.output.is_none());
        assert!(result.key.is_none());
    }

    #[test]
    fn test_report_counts() {
        let mut report = BuildReport::new();
        report.add_result(ok("a"));
        report.add_result(ArtifactResult::failed(
            "b".to_string(),
            ArtifactKind::Folder,
            "error".to_string(),
        ));

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.is_success());
        assert_eq!(report.all_outputs(), vec![&PathBuf::from("a.h")]);
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut first = BuildReport::new();
        first.add_result(ok("a"));
        let mut second = BuildReport::new();
        second.add_result(ok("b"));
        second.unrecognized.push(PathBuf::from("logo.png"));

        first.merge(second);
        let sources: Vec<_> = first.artifacts.iter().map(|a| a.source.as_str()).collect();
        assert_eq!(sources, vec!["a", "b"]);
        assert_eq!(first.unrecognized.len(), 1);
    }

    #[test]
    fn test_summary_lists_failures_and_warnings() {
        let mut report = BuildReport::new();
        report.add_result(ok("a").with_warnings(vec!["KEY collides".to_string()]));
        report.add_result(ArtifactResult::failed(
            "hero".to_string(),
            ArtifactKind::Character,
            "bad size".to_string(),
        ));

        let summary = report.summary();
        assert!(summary.contains("Build failed: 1 written, 1 failed (2 total)"));
        assert!(summary.contains("character 'hero': failed: bad size"));
        assert!(summary.contains("a: KEY collides"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let mut report = BuildReport::new();
        report.add_result(ok("logo").with_size(4, 4));

        let json = serde_json::to_value(&report).unwrap();
        let artifact = &json["artifacts"][0];
        assert_eq!(artifact["status"], "success");
        assert_eq!(artifact["kind"], "single");
        assert_eq!(artifact["key"], 0xF81F);
        assert_eq!(artifact["size"], serde_json::json!([4, 4]));
        assert!(artifact.get("characters").is_none());
        assert!(json.get("total_duration").is_none());
    }
}
