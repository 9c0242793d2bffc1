//! Data Model: Diagnostic, Directive, stage outputs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A leveled, optionally line-attributed pipeline event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub level: Level,
    /// 1-indexed line in the original source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_line: Option<usize>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            source_line: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(Level::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.source_line = Some(line);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: {}", self.level, self.message)?;
        if let Some(line) = self.source_line {
            write!(f, " (line {})", line)?;
        }
        Ok(())
    }
}

/// A `@name` / `@name(value)` instruction found in a source comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub name: String,
    /// Parenthesized content, verbatim, without the parentheses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// First line of the comment (1-indexed, inclusive)
    pub begin_line: usize,
    /// Last line of the comment (1-indexed, inclusive)
    pub end_line: usize,
}

/// Text produced by a stage plus the diagnostics it appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutput {
    pub code: String,
    pub logs: Vec<Diagnostic>,
}

impl StageOutput {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            logs: Vec::new(),
        }
    }

    pub fn with_log(mut self, diagnostic: Diagnostic) -> Self {
        self.logs.push(diagnostic);
        self
    }
}

/// Output of the directive extraction stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOutput {
    pub code: String,
    pub logs: Vec<Diagnostic>,
    pub configs: Vec<Directive>,
}

/// Record of one executed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTrace {
    pub id: String,
    pub in_hash: String,
    pub out_hash: String,
    pub latency_ms: u64,
    /// Number of diagnostics the stage appended
    pub diagnostics: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub code: String,
    pub logs: Vec<Diagnostic>,
    #[serde(default)]
    pub stages: Vec<StageTrace>,
}

impl PipelineOutput {
    pub fn has_errors(&self) -> bool {
        self.logs.iter().any(|log| log.level == Level::Error)
    }

    pub fn count(&self, level: Level) -> usize {
        self.logs.iter().filter(|log| log.level == level).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_diagnostic_display() {
        assert_eq!(Diagnostic::warn("No default export found").to_string(), "warn: No default export found");
        assert_eq!(
            Diagnostic::info("Skipping compilation because of @skip comment")
                .at_line(3)
                .to_string(),
            "info: Skipping compilation because of @skip comment (line 3)"
        );
    }

    #[test]
    fn test_diagnostic_serializes_lowercase_level() {
        let value = serde_json::to_value(Diagnostic::error("boom").at_line(7)).unwrap();
        assert_eq!(value, json!({ "message": "boom", "level": "error", "source_line": 7 }));

        let value = serde_json::to_value(Diagnostic::info("hi")).unwrap();
        assert_eq!(value, json!({ "message": "hi", "level": "info" }));
    }

    #[test]
    fn test_pipeline_output_counts() {
        let output = PipelineOutput {
            code: String::new(),
            logs: vec![Diagnostic::warn("a"), Diagnostic::warn("b"), Diagnostic::info("c")],
            stages: Vec::new(),
        };
        assert_eq!(output.count(Level::Warn), 2);
        assert!(!output.has_errors());
    }
}
