//! Structured diff nodes.
//!
//! Leaves carry the two compared values. Containers carry only children and
//! derive their change from them, so a container can never claim to be
//! unchanged while one of its descendants changed.

use serde::Serialize;
use serde_json::Value;
use vellum_schema::FieldPath;
use vellum_types::LocaleCode;

/// How a value differs between the base and the comparison snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Unchanged,
    /// Present only in the comparison.
    Added,
    /// Present only in the base.
    Removed,
    Modified,
}

impl ChangeKind {
    /// The change seen with base and comparison swapped.
    pub fn flipped(self) -> Self {
        match self {
            Self::Added => Self::Removed,
            Self::Removed => Self::Added,
            other => other,
        }
    }

    pub fn is_change(self) -> bool {
        self != Self::Unchanged
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        }
    }
}

/// What a node stands for in the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// A named field.
    Field,
    /// One row of an array or blocks field.
    Row,
    /// One locale's value of a localized field.
    Locale,
}

/// One node of a field-level diff.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffNode {
    path: FieldPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    locale: Option<LocaleCode>,
    kind: NodeKind,
    change: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<DiffNode>,
}

impl DiffNode {
    /// A leaf comparing two values. `equal` is only consulted when both
    /// values are present.
    pub fn leaf(
        path: FieldPath,
        kind: NodeKind,
        before: Option<Value>,
        after: Option<Value>,
        equal: bool,
    ) -> Self {
        let change = match (&before, &after) {
            (None, None) => ChangeKind::Unchanged,
            (Some(_), None) => ChangeKind::Removed,
            (None, Some(_)) => ChangeKind::Added,
            (Some(_), Some(_)) if equal => ChangeKind::Unchanged,
            (Some(_), Some(_)) => ChangeKind::Modified,
        };
        Self {
            path,
            locale: None,
            kind,
            change,
            block_type: None,
            before,
            after,
            children: Vec::new(),
        }
    }

    /// A container whose change is derived from `children`.
    pub fn container(path: FieldPath, kind: NodeKind, children: Vec<DiffNode>) -> Self {
        let change = if children.iter().any(|c| c.change.is_change()) {
            ChangeKind::Modified
        } else {
            ChangeKind::Unchanged
        };
        Self {
            path,
            locale: None,
            kind,
            change,
            block_type: None,
            before: None,
            after: None,
            children,
        }
    }

    /// Mark this node as the value of one locale.
    pub fn into_locale(mut self, locale: LocaleCode) -> Self {
        self.kind = NodeKind::Locale;
        self.locale = Some(locale);
        self
    }

    pub fn with_block_type(mut self, block_type: Option<&str>) -> Self {
        self.block_type = block_type.map(str::to_string);
        self
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn locale(&self) -> Option<&LocaleCode> {
        self.locale.as_ref()
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn change(&self) -> ChangeKind {
        self.change
    }

    /// Discriminant of a block row.
    pub fn block_type(&self) -> Option<&str> {
        self.block_type.as_deref()
    }

    pub fn before(&self) -> Option<&Value> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&Value> {
        self.after.as_ref()
    }

    pub fn children(&self) -> &[DiffNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order iterator over this node and its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &DiffNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Number of changed leaves by kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl ChangeCounts {
    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified
    }
}

/// Diff of a whole document: one node per top-level data field.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DiffTree {
    nodes: Vec<DiffNode>,
}

impl DiffTree {
    pub fn new(nodes: Vec<DiffNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[DiffNode] {
        &self.nodes
    }

    /// Returns `true` if no field changed.
    pub fn is_unchanged(&self) -> bool {
        self.nodes.iter().all(|n| !n.change().is_change())
    }

    /// Pre-order iterator over every node.
    pub fn iter(&self) -> impl Iterator<Item = &DiffNode> {
        self.nodes.iter().flat_map(DiffNode::iter)
    }

    /// Count changed leaves.
    pub fn counts(&self) -> ChangeCounts {
        let mut counts = ChangeCounts::default();
        for node in self.iter().filter(|n| n.is_leaf()) {
            match node.change() {
                ChangeKind::Added => counts.added += 1,
                ChangeKind::Removed => counts.removed += 1,
                ChangeKind::Modified => counts.modified += 1,
                ChangeKind::Unchanged => {}
            }
        }
        counts
    }

    /// Find the first node at a dotted path, optionally for one locale.
    pub fn find(&self, path: &str, locale: Option<&str>) -> Option<&DiffNode> {
        self.iter().find(|n| {
            n.path().to_string() == path && n.locale().map(LocaleCode::as_str) == locale
        })
    }
}
