//! Segment node entities: node kinds, leaf references and the wire form

use std::fmt;

use serde::{Deserialize, Serialize};

/// Source kind whose references carry a join column.
pub const REPORT_SOURCE_KIND: &str = "report";

/// Combinator or leaf marker of a segment node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SegmentKind {
    And,
    Or,
    #[default]
    Source,
}

impl SegmentKind {
    pub fn is_combinator(self) -> bool {
        matches!(self, SegmentKind::And | SegmentKind::Or)
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::And => write!(f, "AND"),
            SegmentKind::Or => write!(f, "OR"),
            SegmentKind::Source => write!(f, "SOURCE"),
        }
    }
}

/// Reference from a leaf to one external data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    /// Kind of source, e.g. "report" or "list"
    pub source_kind: String,
    /// Identifier of the source record
    pub source_id: String,
    /// Display name of the source record
    pub source_name: String,
    /// Join column, only meaningful for report sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
}

impl SourceRef {
    pub fn new(
        source_kind: impl Into<String>,
        source_id: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            source_kind: source_kind.into(),
            source_id: source_id.into(),
            source_name: source_name.into(),
            column_name: None,
        }
    }

    pub fn with_column(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    /// Whether this source is a tabular report that needs a join column.
    pub fn is_report(&self) -> bool {
        self.source_kind.eq_ignore_ascii_case(REPORT_SOURCE_KIND)
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' ({})",
            self.source_kind, self.source_name, self.source_id
        )?;
        if let Some(column) = &self.column_name {
            write!(f, " on {}", column)?;
        }
        Ok(())
    }
}

/// Payload stored on every arena node.
///
/// Carries no structure: children and back-references live on the arena node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SegmentData {
    pub kind: SegmentKind,
    /// Only set on the persisted root's two children
    pub is_exclusion: bool,
    pub source_ref: Option<SourceRef>,
}

impl SegmentData {
    /// Empty leaf awaiting a source reference.
    pub fn leaf() -> Self {
        Self::default()
    }

    pub fn combinator(kind: SegmentKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn and() -> Self {
        Self::combinator(SegmentKind::And)
    }

    pub fn or() -> Self {
        Self::combinator(SegmentKind::Or)
    }
}

impl fmt::Display for SegmentData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.source_ref) {
            (SegmentKind::Source, Some(source)) => write!(f, "SOURCE {}", source)?,
            (SegmentKind::Source, None) => write!(f, "SOURCE <empty>")?,
            (kind, _) => write!(f, "{}", kind)?,
        }
        if self.is_exclusion {
            write!(f, " [exclude]")?;
        }
        Ok(())
    }
}

/// Owned, recursive wire form of a segment tree.
///
/// Has no parent or root fields: those only exist on the linked arena.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentNode {
    /// Absent on input means an implicit SOURCE leaf
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SegmentKind>,
    /// Present only on the persisted root's direct children
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_exclusion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<SourceRef>,
    #[serde(default)]
    pub children: Vec<SegmentNode>,
}

impl SegmentNode {
    pub fn leaf() -> Self {
        Self {
            kind: Some(SegmentKind::Source),
            ..Self::default()
        }
    }

    pub fn source(source_ref: SourceRef) -> Self {
        Self {
            kind: Some(SegmentKind::Source),
            source_ref: Some(source_ref),
            ..Self::default()
        }
    }

    pub fn group(kind: SegmentKind, children: Vec<SegmentNode>) -> Self {
        Self {
            kind: Some(kind),
            children,
            ..Self::default()
        }
    }

    pub fn excluded(mut self, is_exclusion: bool) -> Self {
        self.is_exclusion = Some(is_exclusion);
        self
    }

    /// Kind after applying the implicit-leaf rule.
    pub fn effective_kind(&self) -> SegmentKind {
        self.kind.unwrap_or(SegmentKind::Source)
    }
}

/// Candidate returned by the leaf-reference lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCandidate {
    pub source_name: String,
    pub source_id: String,
}

/// Candidate join column of a report source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCandidate {
    /// Column identifier stored as `columnName`
    pub name: String,
    /// Human readable label
    pub label: String,
}
