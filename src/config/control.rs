//! Control-file event definitions.
//!
//! Event parameters are written as whitespace-separated tokens in a fixed
//! order, one event per line, with `#` starting a comment:
//!
//! ```text
//! # kind                      duration range spring rest [half-angle]
//! PolymerFormsBondTriple      50 1.5 10.0 1.0
//! BondBindsToPolymerHead      100 1.5 10.0 1.0
//! BondBindsForwardConeToPolymerHead 100 1.5 10.0 1.0 0.7854
//! ```
//!
//! Parsing is strict: a missing or malformed token and any trailing tokens
//! are typed errors surfaced to the loader, never silently skipped.

use std::path::Path;

use thiserror::Error;

use crate::kinetics::ParamError;

/// Error raised while parsing or instantiating control-file events
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("unknown event type '{0}'")]
    UnknownEventType(String),
    #[error("missing token: expected {0}")]
    MissingToken(&'static str),
    #[error("malformed token '{token}': expected {expected}")]
    MalformedToken {
        token: String,
        expected: &'static str,
    },
    #[error("{0} unexpected trailing token(s)")]
    TrailingTokens(usize),
    #[error("event type '{kind}' cannot be attached to {target}")]
    TargetMismatch {
        kind: String,
        target: &'static str,
    },
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Forward-only cursor over the whitespace tokens of one event line
#[derive(Debug)]
pub struct TokenCursor<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            tokens: text.split_whitespace().collect(),
            pos: 0,
        }
    }

    fn next_token(&mut self, expected: &'static str) -> Result<&'a str, ControlError> {
        let token = self
            .tokens
            .get(self.pos)
            .copied()
            .ok_or(ControlError::MissingToken(expected))?;
        self.pos += 1;
        Ok(token)
    }

    pub fn next_u32(&mut self, expected: &'static str) -> Result<u32, ControlError> {
        let token = self.next_token(expected)?;
        token.parse().map_err(|_| ControlError::MalformedToken {
            token: token.to_string(),
            expected,
        })
    }

    pub fn next_f32(&mut self, expected: &'static str) -> Result<f32, ControlError> {
        let token = self.next_token(expected)?;
        token.parse().map_err(|_| ControlError::MalformedToken {
            token: token.to_string(),
            expected,
        })
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }

    /// Assert every token was consumed
    pub fn finish(self) -> Result<(), ControlError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(ControlError::TrailingTokens(n)),
        }
    }
}

/// One parsed control-file line: the event type key and its raw argument
/// tokens, still in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLine {
    pub kind: String,
    pub args: Vec<String>,
}

impl EventLine {
    pub fn new(kind: impl Into<String>, args_text: &str) -> Self {
        Self {
            kind: kind.into(),
            args: args_text.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Cursor over the argument tokens
    pub fn cursor(&self) -> TokenCursor<'_> {
        let mut cursor = TokenCursor {
            tokens: Vec::with_capacity(self.args.len()),
            pos: 0,
        };
        cursor.tokens.extend(self.args.iter().map(String::as_str));
        cursor
    }

    /// Serialize back to the control-file line form
    pub fn to_line(&self) -> String {
        if self.args.is_empty() {
            self.kind.clone()
        } else {
            format!("{} {}", self.kind, self.args.join(" "))
        }
    }
}

/// Parse a full control-file text into event lines, skipping blank lines
/// and `#` comments
pub fn parse_control_text(text: &str) -> Result<Vec<EventLine>, ControlError> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let line = match raw.find('#') {
            Some(idx) => &raw[..idx],
            None => raw,
        };
        let mut tokens = line.split_whitespace();
        let Some(kind) = tokens.next() else {
            continue;
        };
        lines.push(EventLine {
            kind: kind.to_string(),
            args: tokens.map(str::to_string).collect(),
        });
    }
    Ok(lines)
}

/// Read and parse a control file from disk
pub fn load_control_file<P: AsRef<Path>>(path: P) -> Result<Vec<EventLine>, ControlError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let lines = parse_control_text(&text)?;
    log::info!(
        "loaded {} event definition(s) from {:?}",
        lines.len(),
        path.as_ref()
    );
    Ok(lines)
}
