//! # Option Encoders
//!
//! Typed per-command options and their wire tokens. Each command accepts
//! only its own option type, so mixing options across commands does not
//! type-check; the remaining rule checks (duplicates, unknown keywords)
//! happen here, before a command is sent.

use std::str::FromStr;

use bytes::Bytes;

use crate::error::{RjsError, RjsResult};

/// Output formatting for `JSON.GET`.
///
/// The store's grammar fixes the order; options are emitted as INDENT,
/// NEWLINE, SPACE, NOESCAPE whatever order the caller gives them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetOption {
    /// Indentation string for nested levels.
    Indent(String),
    /// String printed at the end of each line.
    Newline(String),
    /// String placed between a key and its value.
    Space(String),
    /// Legacy flag accepted for compatibility.
    NoEscape,
}

impl GetOption {
    fn rank(&self) -> usize {
        match self {
            GetOption::Indent(_) => 0,
            GetOption::Newline(_) => 1,
            GetOption::Space(_) => 2,
            GetOption::NoEscape => 3,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            GetOption::Indent(_) => "INDENT",
            GetOption::Newline(_) => "NEWLINE",
            GetOption::Space(_) => "SPACE",
            GetOption::NoEscape => "NOESCAPE",
        }
    }

    fn value(&self) -> Option<&str> {
        match self {
            GetOption::Indent(value) | GetOption::Newline(value) | GetOption::Space(value) => {
                Some(value)
            }
            GetOption::NoEscape => None,
        }
    }
}

/// Encodes formatting options in canonical order. Each option may appear once.
pub(crate) fn encode_get_options(options: &[GetOption]) -> RjsResult<Vec<Bytes>> {
    let mut ordered: [Option<&GetOption>; 4] = [None; 4];
    for option in options {
        let slot = &mut ordered[option.rank()];
        if slot.is_some() {
            return Err(RjsError::UnsupportedOption {
                command: "JSON.GET",
                option: format!("{} given more than once", option.keyword()),
            });
        }
        *slot = Some(option);
    }

    let mut tokens = Vec::with_capacity(options.len() * 2);
    for option in ordered.into_iter().flatten() {
        tokens.push(Bytes::from_static(option.keyword().as_bytes()));
        if let Some(value) = option.value() {
            tokens.push(Bytes::copy_from_slice(value.as_bytes()));
        }
    }
    Ok(tokens)
}

/// Conditional write modifier for `JSON.SET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetCondition {
    #[default]
    Always,
    /// `NX`: only write when the path does not exist yet.
    IfAbsent,
    /// `XX`: only write when the path already exists.
    IfPresent,
}

impl SetCondition {
    pub(crate) fn token(self) -> Option<&'static str> {
        match self {
            SetCondition::Always => None,
            SetCondition::IfAbsent => Some("NX"),
            SetCondition::IfPresent => Some("XX"),
        }
    }
}

impl FromStr for SetCondition {
    type Err = RjsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "" => Ok(SetCondition::Always),
            "NX" => Ok(SetCondition::IfAbsent),
            "XX" => Ok(SetCondition::IfPresent),
            _ => Err(unsupported("JSON.SET", s)),
        }
    }
}

/// Element removed by `JSON.ARRPOP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopTarget {
    /// Index 0.
    First,
    /// Index -1, the store's default.
    #[default]
    Last,
    /// Any index; negative counts from the end.
    Index(i64),
}

impl PopTarget {
    /// The index token, or `None` when the store default already means it.
    pub(crate) fn index(self) -> Option<i64> {
        match self {
            PopTarget::First => Some(0),
            PopTarget::Last => None,
            PopTarget::Index(index) => Some(index),
        }
    }
}

impl FromStr for PopTarget {
    type Err = RjsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FIRST" => Ok(PopTarget::First),
            "LAST" => Ok(PopTarget::Last),
            other => other
                .parse()
                .map(PopTarget::Index)
                .map_err(|_| unsupported("JSON.ARRPOP", s)),
        }
    }
}

/// Search window for `JSON.ARRINDEX`, as `[start, stop)`.
///
/// A stop without a start cannot be expressed, matching the command grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchRange {
    /// The whole array.
    #[default]
    Whole,
    /// From `start` to the end of the array.
    From(i64),
    /// From `start` up to, but not including, `stop`.
    Window(i64, i64),
}

impl SearchRange {
    pub(crate) fn bounds(self) -> Vec<i64> {
        match self {
            SearchRange::Whole => Vec::new(),
            SearchRange::From(start) => vec![start],
            SearchRange::Window(start, stop) => vec![start, stop],
        }
    }
}

/// `JSON.DEBUG` subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSubcommand {
    /// Help text; takes no key or path.
    Help,
    /// Memory used by the value at a path, in bytes.
    Memory,
}

impl DebugSubcommand {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            DebugSubcommand::Help => "HELP",
            DebugSubcommand::Memory => "MEMORY",
        }
    }
}

impl FromStr for DebugSubcommand {
    type Err = RjsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HELP" => Ok(DebugSubcommand::Help),
            "MEMORY" => Ok(DebugSubcommand::Memory),
            _ => Err(unsupported("JSON.DEBUG", s)),
        }
    }
}

fn unsupported(command: &'static str, option: &str) -> RjsError {
    RjsError::UnsupportedOption {
        command,
        option: option.to_string(),
    }
}
