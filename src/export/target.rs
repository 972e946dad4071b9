//! Export targets: classification into literal queries or object names, and
//! splitting of the comma-delimited target list.

use std::fmt;
use tracing::warn;

/// The keyword that marks a target as a literal query.
pub const QUERY_KEYWORD: &str = "SELECT";

/// A single requested export: a SQL query or a table/view name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportTarget(String);

/// How a target is turned into a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// The target is a literal query, executed verbatim.
    Query,
    /// The target names a table or view, exported in full.
    ObjectName,
}

/// Result of classifying an export target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedTarget {
    /// Whether the target was a literal query or an object name.
    pub kind: TargetKind,
    /// The SQL text to execute.
    pub sql: String,
}

impl ExportTarget {
    /// Creates a target from its raw text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the raw target text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the target's first word is the query keyword.
    pub fn is_query(&self) -> bool {
        starts_with_query_keyword(&self.0)
    }

    /// Decides whether this target is a literal query or an object name and
    /// produces the SQL to run.
    pub fn classify(&self) -> ClassifiedTarget {
        if self.is_query() {
            ClassifiedTarget {
                kind: TargetKind::Query,
                sql: self.0.clone(),
            }
        } else {
            ClassifiedTarget {
                kind: TargetKind::ObjectName,
                sql: format!("SELECT * FROM {}", self.0),
            }
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExportTarget {
    fn from(v: &str) -> Self {
        Self::new(v)
    }
}

impl From<String> for ExportTarget {
    fn from(v: String) -> Self {
        Self(v)
    }
}

/// Returns true if the leading word of `text` equals the query keyword, ignoring case.
fn starts_with_query_keyword(text: &str) -> bool {
    let word_len = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());

    text[..word_len].eq_ignore_ascii_case(QUERY_KEYWORD)
}

/// Splits a comma-delimited target list into ordered export targets.
///
/// Commas inside quotes or parentheses never split. Once a query starts, the
/// following segments belong to it until a segment that starts a new query,
/// so `EMPLOYEES,SELECT id,name FROM DEPT` yields two targets. Object names
/// must therefore be listed before queries. Segments are trimmed and empty
/// segments dropped.
pub fn parse_targets(list: &str) -> Vec<ExportTarget> {
    let mut targets: Vec<String> = Vec::new();
    let mut in_query = false;

    for segment in split_top_level(list) {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }

        let starts_query = starts_with_query_keyword(trimmed);
        if in_query && !starts_query {
            if let Some(query) = targets.last_mut() {
                if looks_like_trailing_object(query, trimmed) {
                    warn!(
                        "'{}' after a query is read as part of that query; list object names before queries to export it as its own sheet",
                        trimmed
                    );
                }
                query.push(',');
                query.push_str(segment.trim_end());
            }
            continue;
        }

        in_query = starts_query;
        targets.push(trimmed.to_string());
    }

    targets.into_iter().map(ExportTarget).collect()
}

/// Returns true if `segment` is a bare identifier continuing a query that
/// already has a FROM clause, i.e. most likely an object name listed after a
/// query rather than part of its select list.
fn looks_like_trailing_object(query: &str, segment: &str) -> bool {
    let is_identifier = !segment.starts_with(|c: char| c.is_ascii_digit())
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | '#'));

    is_identifier
        && query
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .any(|word| word.eq_ignore_ascii_case("FROM"))
}

/// Splits on commas that are outside quotes and parentheses.
fn split_top_level(list: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth: usize = 0;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in list.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    segments.push(&list[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }

    segments.push(&list[start..]);
    segments
}
