//! Rendering of mined graphs, statistics summaries and errors.
//!
//! `fm mine` and `fm info` build one serializable report each and hand it
//! to [`render_mode`] together with a tab-separated text renderer and a
//! sectioned terminal renderer. JSON goes through `serde_json` unchanged.
//!
//! # Choosing a mode
//!
//! `--format` beats `--json`, which beats `FLOWMINE_FORMAT`, which beats the
//! config `output` key. Without any of those, a terminal gets
//! [`OutputMode::Pretty`] and a pipe gets [`OutputMode::Text`].

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

/// Width of the dashed rule under section headings.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Dashed rule spanning [`PRETTY_RULE_WIDTH`] columns.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Heading line such as `Flows` or `Boundaries`, underlined.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// `key:` padded to 16 columns, then the value.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<16} {}", format!("{key}:"), value.as_ref())
}

/// How a report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Sectioned tables for a terminal.
    Pretty,
    /// One tab-separated record per line.
    Text,
    /// The report struct as pretty-printed JSON.
    Json,
}

impl OutputMode {
    /// Mode for a name returned by `flowmine_core::config::resolve_output`.
    pub fn from_resolved(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            "text" => Self::Text,
            _ => Self::Pretty,
        }
    }
}

/// Write `value` to stdout in `mode`, using the given text and pretty renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Failure report printed on stderr before a non-zero exit.
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    /// Full `anyhow` chain, outermost context first.
    pub message: String,
    /// Hint attached to the error code, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// `E####` code of the underlying `MiningError`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Failure with no `E####` code attached.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Error carrying the message, code and hint of `code`.
    pub fn with_code(message: impl Into<String>, code: flowmine_core::ErrorCode) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }

    /// Build from an `anyhow` chain, lifting code and hint from a
    /// [`flowmine_core::MiningError`] anywhere in it.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");
        match err
            .chain()
            .find_map(|cause| cause.downcast_ref::<flowmine_core::MiningError>())
        {
            Some(mining) => Self::with_code(message, mining.code()),
            None => Self::new(message),
        }
    }
}

/// Print `error` on stderr: `error[E####]: ...` plus a suggestion line, or a
/// JSON object under an `error` key.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match error.error_code {
                Some(ref code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use flowmine_core::MiningError;

    #[test]
    fn resolved_names_map_to_modes() {
        assert_eq!(OutputMode::from_resolved("json"), OutputMode::Json);
        assert_eq!(OutputMode::from_resolved("text"), OutputMode::Text);
        assert_eq!(OutputMode::from_resolved("pretty"), OutputMode::Pretty);
    }

    #[test]
    fn mining_errors_carry_code_through_context() {
        let err = Err::<(), _>(MiningError::InvalidDependencyThreshold(2.0))
            .context("mining log.json")
            .expect_err("error");
        let cli = CliError::from_anyhow(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E4002"));
        assert!(cli.suggestion.is_some());
        assert!(cli.message.contains("mining log.json"));
    }

    #[test]
    fn plain_errors_have_no_code() {
        let cli = CliError::from_anyhow(&anyhow::anyhow!("boom"));
        assert_eq!(cli.message, "boom");
        assert!(cli.error_code.is_none());
    }

    #[test]
    fn pretty_kv_pads_key() {
        let mut buf = Vec::new();
        pretty_kv(&mut buf, "events", "3").expect("write");
        let line = String::from_utf8(buf).expect("utf8");
        assert!(line.starts_with("events:"));
        assert!(line.trim_end().ends_with('3'));
    }
}
