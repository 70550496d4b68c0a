//! Output layer for pretty/text/JSON parity.
//!
//! Every handled input produces a [`Reply`]: the command feedback plus, when
//! the view is worth showing, a [`Screen`] snapshot of what the session
//! currently displays.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `output` in the config file
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use saveit_core::error::{ErrorCode, LogicError};
use saveit_core::logic::{CommandParser, LogicManager, Storage};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, visual framing).
    Pretty,
    /// Token-efficient plain text for agents and pipes.
    Text,
    /// One JSON object per handled input.
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    configured: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }
    if json_flag {
        return OutputMode::Json;
    }
    format_env
        .and_then(OutputMode::from_name)
        .or_else(|| configured.and_then(OutputMode::from_name))
        .unwrap_or(if is_tty {
            OutputMode::Pretty
        } else {
            OutputMode::Text
        })
}

/// Resolve the output mode from CLI flags, environment, config and TTY defaults.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    configured: Option<&str>,
) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(
        format_flag,
        json_flag,
        env_val.as_deref(),
        configured,
        is_tty,
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRow {
    pub index: usize,
    pub statement: String,
    pub description: String,
    pub tags: Vec<String>,
    pub solutions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionRow {
    pub index: usize,
    pub link: String,
    pub remark: String,
    pub primary: bool,
}

/// What the session displays right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    pub issues: Vec<IssueRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solutions: Option<Vec<SolutionRow>>,
}

impl Screen {
    pub fn capture<P: CommandParser, S: Storage>(logic: &LogicManager<P, S>) -> Self {
        let issues = logic
            .sorted_issues()
            .into_iter()
            .enumerate()
            .map(|(i, issue)| IssueRow {
                index: i + 1,
                statement: issue.statement().to_string(),
                description: issue.description().to_string(),
                tags: issue.tags().iter().map(|t| t.name().to_string()).collect(),
                solutions: issue.solutions().len(),
            })
            .collect();
        let solutions = logic.selected_solutions().map(|ordered| {
            ordered
                .into_iter()
                .enumerate()
                .map(|(i, (_, solution))| SolutionRow {
                    index: i + 1,
                    link: solution.link().to_string(),
                    remark: solution.remark().to_string(),
                    primary: solution.is_primary(),
                })
                .collect()
        });
        Self {
            issues,
            selected: logic
                .selected_issue()
                .map(|issue| issue.statement().to_string()),
            solutions,
        }
    }

    fn render_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        if let (Some(statement), Some(solutions)) = (&self.selected, &self.solutions) {
            pretty_section(w, &format!("Solutions for: {statement}"))?;
            if solutions.is_empty() {
                writeln!(w, "  (no solutions yet)")?;
            }
            for row in solutions {
                let star = if row.primary { "*" } else { " " };
                write!(w, "{star}{:>3}. {}", row.index, row.link)?;
                if !row.remark.is_empty() {
                    write!(w, "  ({})", row.remark)?;
                }
                writeln!(w)?;
            }
            return Ok(());
        }

        pretty_section(w, &format!("Issues ({})", self.issues.len()))?;
        for row in &self.issues {
            write!(w, "{:>4}. {}", row.index, row.statement)?;
            if !row.tags.is_empty() {
                write!(w, "  [{}]", row.tags.join(", "))?;
            }
            writeln!(w)?;
            if !row.description.is_empty() {
                writeln!(w, "      {}", row.description)?;
            }
        }
        Ok(())
    }

    fn render_text(&self, w: &mut dyn Write) -> io::Result<()> {
        if let Some(solutions) = &self.solutions {
            for row in solutions {
                let primary = if row.primary { "*" } else { "-" };
                writeln!(w, "{}\t{primary}\t{}\t{}", row.index, row.link, row.remark)?;
            }
            return Ok(());
        }
        for row in &self.issues {
            writeln!(w, "{}\t{}\t{}", row.index, row.statement, row.tags.join(","))?;
        }
        Ok(())
    }
}

/// Rendered outcome of one successfully handled input.
#[derive(Debug, Serialize)]
pub struct Reply {
    pub ok: bool,
    pub feedback: String,
    pub exit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<Screen>,
}

pub fn render_reply(mode: OutputMode, reply: &Reply, w: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer(&mut *w, reply)?;
            writeln!(w)?;
        }
        OutputMode::Pretty => {
            writeln!(w, "{}", reply.feedback)?;
            if let Some(view) = &reply.view {
                writeln!(w)?;
                view.render_pretty(w)?;
            }
        }
        OutputMode::Text => {
            writeln!(w, "{}", reply.feedback)?;
            if let Some(view) = &reply.view {
                view.render_text(w)?;
            }
        }
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E2003").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// An error carrying `code` and its hint.
    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

impl From<&LogicError> for CliError {
    fn from(err: &LogicError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: err.hint().map(str::to_string),
            error_code: Some(err.code().code().to_string()),
        }
    }
}

/// Render an error in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError, w: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "ok": false,
                "error": error,
            });
            serde_json::to_writer(&mut *w, &wrapper)?;
            writeln!(w)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(w, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(w, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}
