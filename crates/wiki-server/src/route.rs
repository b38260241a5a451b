//! Request path validation.
//!
//! Every page URL has the shape `/{operation}/{title}`:
//!
//! - `operation` is one of `view`, `edit`, `save`
//! - `title` is one or more ASCII letters or digits
//!
//! The title becomes a file name in the page store, so this grammar is what
//! keeps requests from reaching outside the data directory. Anything else is
//! rejected before a handler runs.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// Full grammar for a page path. The raw (still percent-encoded) path is
/// matched, so escaped separators never pass.
static PAGE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(view|edit|save)/([a-zA-Z0-9]+)$").unwrap());

/// The verb a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Operation {
    View,
    Edit,
    Save,
}

impl Operation {
    /// Path token for this operation.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Save => "save",
        }
    }

    /// URL path for this operation on `title`.
    pub(crate) fn path_for(self, title: &str) -> String {
        format!("/{}/{title}", self.as_str())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = InvalidPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            "save" => Ok(Self::Save),
            _ => Err(InvalidPath),
        }
    }
}

/// A validated page path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PagePath<'a> {
    pub(crate) operation: Operation,
    pub(crate) title: &'a str,
}

/// The path does not match the page grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("path does not match /(view|edit|save)/<title>")]
pub(crate) struct InvalidPath;

/// Split a raw request path into operation and title.
///
/// Pure: the same input always yields the same result.
pub(crate) fn parse_path(raw_path: &str) -> Result<PagePath<'_>, InvalidPath> {
    let caps = PAGE_PATH_RE.captures(raw_path).ok_or(InvalidPath)?;
    let operation = caps.get(1).ok_or(InvalidPath)?.as_str().parse()?;
    let title = caps.get(2).ok_or(InvalidPath)?.as_str();
    Ok(PagePath { operation, title })
}
