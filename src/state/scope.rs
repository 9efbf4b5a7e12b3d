//! Scope registry.
//!
//! A scope is one export request (command plus arguments). The scopes stored
//! in an [`ExportState`] define which pages the state may contain, and are
//! replayed by `cme sync` to rediscover them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{CmeError, Result};

use super::ExportState;

/// One recorded export request.
///
/// Equality is structural on `(command, args)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeEntry {
    /// Export command name (e.g. `spaces`).
    pub command: String,
    /// Arguments passed to the command.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Export commands that can be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Individual pages by id.
    Pages,
    /// Pages plus every descendant.
    PagesWithDescendants,
    /// Every page of the listed spaces.
    Spaces,
    /// Every page of every global space.
    AllSpaces,
}

/// Result of [`add_scope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeAddition {
    Added,
    AlreadyPresent,
}

impl ScopeKind {
    /// Canonical command name as stored in state files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pages => "pages",
            Self::PagesWithDescendants => "pages-with-descendants",
            Self::Spaces => "spaces",
            Self::AllSpaces => "all-spaces",
        }
    }

    /// Parse a command name, accepting underscore spellings.
    pub fn parse(command: &str) -> Option<Self> {
        match command.replace('_', "-").as_str() {
            "pages" => Some(Self::Pages),
            "pages-with-descendants" => Some(Self::PagesWithDescendants),
            "spaces" => Some(Self::Spaces),
            "all-spaces" => Some(Self::AllSpaces),
            _ => None,
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ScopeEntry {
    /// Create a scope entry.
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a scope entry for a known command.
    pub fn for_kind(kind: ScopeKind, args: Vec<String>) -> Self {
        Self {
            command: kind.as_str().to_string(),
            args,
        }
    }

    /// The command this scope replays, if known.
    pub fn kind(&self) -> Option<ScopeKind> {
        ScopeKind::parse(&self.command)
    }
}

impl fmt::Display for ScopeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{} (none)", self.command)
        } else {
            write!(f, "{} {}", self.command, self.args.join(" "))
        }
    }
}

static PAGE_ID_IN_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:/pages/|[?&]pageId=)(\d+)").unwrap());

/// Reduce a page argument to its numeric id.
///
/// Accepts a bare id, a URL with a `/pages/<id>` segment, or a URL with a
/// `pageId=<id>` query parameter.
pub fn parse_page_id(arg: &str) -> Option<String> {
    let arg = arg.trim();
    if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()) {
        return Some(arg.to_string());
    }

    PAGE_ID_IN_URL
        .captures(arg)
        .map(|caps| caps[1].to_string())
}

/// Add a scope to the state unless an equal one is already present.
pub fn add_scope(state: &mut ExportState, scope: ScopeEntry) -> ScopeAddition {
    if state.scopes.contains(&scope) {
        ScopeAddition::AlreadyPresent
    } else {
        state.scopes.push(scope);
        ScopeAddition::Added
    }
}

/// Decide which state an export command should write into.
///
/// - No existing state: a fresh state holding only `scope`.
/// - Existing state without `append`: [`CmeError::ScopeConflict`].
/// - Existing state with `append`: identity is checked, then `scope` is
///   added idempotently.
///
/// Nothing is written to disk here.
pub fn guard_export(
    existing: Option<ExportState>,
    output_dir: &Path,
    scope: ScopeEntry,
    source_identity: &str,
    append: bool,
) -> Result<ExportState> {
    let Some(mut state) = existing else {
        let mut state = ExportState::new(source_identity);
        state.scopes.push(scope);
        return Ok(state);
    };

    if !append {
        return Err(CmeError::ScopeConflict {
            path: output_dir.to_path_buf(),
        });
    }

    state.validate_identity(source_identity)?;

    match add_scope(&mut state, scope) {
        ScopeAddition::Added => tracing::info!("Added new scope to existing state"),
        ScopeAddition::AlreadyPresent => tracing::debug!("Scope already recorded; not adding"),
    }

    Ok(state)
}
