//! Flatten a [`DiffTree`] into labelled rows for display.
//!
//! Rendering is pure: labels come from the schema through a [`Translator`],
//! locale names from [`LocaleLabels`]. Output is pre-order, in schema
//! declaration order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vellum_schema::{find_field, AppConfig, Field, LocaleOption, PathSegment};
use vellum_types::LocaleCode;

use crate::node::{ChangeKind, DiffNode, DiffTree, NodeKind};
use crate::text_diff::{diff_words, WordDiff};

/// Translation lookup for UI strings and labels.
pub trait Translator: Send + Sync {
    /// Translate `key`, substituting `{{name}}` placeholders from `params`.
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// English strings for the keys Vellum uses; other keys are returned as-is
/// so configured labels pass through untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTranslator;

const ENGLISH: &[(&str, &str)] = &[
    ("general:row", "Row"),
    ("general:untitled", "Untitled"),
    ("fields:block", "Block"),
    ("version:versions", "Versions"),
    ("version:version", "Version"),
    ("version:autosavedVersion", "Autosaved version"),
    ("version:mostRecent", "Most recent"),
    ("version:published", "Published"),
    ("version:compareVersion", "Compare version against:"),
    ("version:restoreThisVersion", "Restore this version"),
    ("version:versionCreatedOn", "{{version}} created on:"),
    ("version:noChanges", "No changes"),
    ("version:comparisonFailed", "The comparison could not be completed: {{reason}}"),
    ("version:viewingVersion", "Viewing version for the {{entityLabel}} {{documentTitle}}"),
    ("version:viewingVersionGlobal", "Viewing version for the global {{entityLabel}}"),
];

impl Translator for DefaultTranslator {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let template = ENGLISH
            .iter()
            .find(|(k, _)| *k == key)
            .map_or(key, |(_, text)| *text);
        interpolate(template, params)
    }
}

/// Replace `{{name}}` placeholders.
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{{{name}}}}}"), value)
        })
}

/// Display names of configured locales.
#[derive(Clone, Debug, Default)]
pub struct LocaleLabels {
    options: Vec<LocaleOption>,
}

impl LocaleLabels {
    pub fn new(options: Vec<LocaleOption>) -> Self {
        Self { options }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config
                .localization
                .as_ref()
                .map(|l| l.locales.clone())
                .unwrap_or_default(),
        )
    }

    /// The configured label, or the code itself.
    pub fn label(&self, code: &LocaleCode) -> String {
        self.option(code)
            .map_or_else(|| code.to_string(), |o| o.label.clone())
    }

    pub fn rtl(&self, code: &LocaleCode) -> bool {
        self.option(code).is_some_and(|o| o.rtl)
    }

    fn option(&self, code: &LocaleCode) -> Option<&LocaleOption> {
        self.options.iter().find(|o| &o.code == code)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Omit rows whose value did not change.
    pub hide_unchanged: bool,
}

/// One displayable diff row.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub label: String,
    pub path: String,
    pub depth: usize,
    pub kind: NodeKind,
    pub change: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<LocaleCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale_label: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rtl: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
    /// Word-level diff for modified plain-text values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_diff: Option<WordDiff>,
}

struct Context<'a> {
    locale_labels: &'a LocaleLabels,
    translator: &'a dyn Translator,
    options: &'a RenderOptions,
}

/// Flatten `tree` into display rows.
pub fn render(
    tree: &DiffTree,
    fields: &[Field],
    locale_labels: &LocaleLabels,
    translator: &dyn Translator,
    options: &RenderOptions,
) -> Vec<RenderNode> {
    let cx = Context {
        locale_labels,
        translator,
        options,
    };
    let mut out = Vec::new();
    render_fields(fields, tree.nodes(), 0, &cx, &mut out);
    out
}

fn render_fields(
    fields: &[Field],
    nodes: &[DiffNode],
    depth: usize,
    cx: &Context<'_>,
    out: &mut Vec<RenderNode>,
) {
    for node in nodes {
        let field = match node.path().last() {
            Some(PathSegment::Field(name)) => find_field(fields, name),
            _ => None,
        };
        render_node(node, field, depth, cx, out);
    }
}

fn render_node(
    node: &DiffNode,
    field: Option<&Field>,
    depth: usize,
    cx: &Context<'_>,
    out: &mut Vec<RenderNode>,
) {
    if cx.options.hide_unchanged && !node.change().is_change() {
        return;
    }
    let label = match (node.kind(), node.locale()) {
        (NodeKind::Locale, Some(code)) => cx.locale_labels.label(code),
        _ => field_label(field, node, cx),
    };
    out.push(row(node, field, label, depth, cx));
    if node.is_leaf() {
        return;
    }

    let children = node.children();
    if children.iter().all(|c| c.kind() == NodeKind::Locale) {
        for child in children {
            render_node(child, field, depth + 1, cx, out);
        }
        return;
    }
    match field {
        Some(Field::Group(group)) => render_fields(&group.fields, children, depth + 1, cx, out),
        Some(Field::Layout(layout)) => render_fields(&layout.fields, children, depth + 1, cx, out),
        Some(rows @ (Field::Array(_) | Field::Blocks(_))) => {
            for child in children {
                render_row(child, rows, depth + 1, cx, out);
            }
        }
        _ => {
            for child in children {
                render_node(child, None, depth + 1, cx, out);
            }
        }
    }
}

fn render_row(
    node: &DiffNode,
    field: &Field,
    depth: usize,
    cx: &Context<'_>,
    out: &mut Vec<RenderNode>,
) {
    if cx.options.hide_unchanged && !node.change().is_change() {
        return;
    }
    let number = match node.path().last() {
        Some(PathSegment::Index(i)) => i + 1,
        _ => 0,
    };
    let (row_label, fields): (String, &[Field]) = match field {
        Field::Blocks(blocks) => {
            let variant = node.block_type().and_then(|slug| blocks.variant(slug));
            let label = match (variant.and_then(|v| v.label.as_deref()), node.block_type()) {
                (Some(label), _) | (None, Some(label)) => cx.translator.translate(label, &[]),
                (None, None) => cx.translator.translate("fields:block", &[]),
            };
            (label, variant.map_or(&[][..], |v| v.fields.as_slice()))
        }
        Field::Array(array) => (
            cx.translator.translate("general:row", &[]),
            array.fields.as_slice(),
        ),
        _ => (cx.translator.translate("general:row", &[]), &[][..]),
    };

    out.push(row(node, None, format!("{row_label} {number}"), depth, cx));
    if !node.is_leaf() {
        render_fields(fields, node.children(), depth + 1, cx, out);
    }
}

fn field_label(field: Option<&Field>, node: &DiffNode, cx: &Context<'_>) -> String {
    let text = field
        .and_then(|f| f.label().or(f.name()))
        .map(str::to_string)
        .unwrap_or_else(|| node.path().to_string());
    cx.translator.translate(&text, &[])
}

fn row(
    node: &DiffNode,
    field: Option<&Field>,
    label: String,
    depth: usize,
    cx: &Context<'_>,
) -> RenderNode {
    let text_diff = match (field, node.before(), node.after()) {
        (Some(Field::Scalar(scalar)), Some(Value::String(before)), Some(Value::String(after)))
            if scalar.kind.is_textual() && node.change() == ChangeKind::Modified =>
        {
            Some(diff_words(before, after))
        }
        _ => None,
    };
    RenderNode {
        label,
        path: node.path().to_string(),
        depth,
        kind: node.kind(),
        change: node.change(),
        field_type: field.map(|f| f.type_name().to_string()),
        locale: node.locale().cloned(),
        locale_label: node.locale().map(|c| cx.locale_labels.label(c)),
        rtl: node.locale().is_some_and(|c| cx.locale_labels.rtl(c)),
        before: node.before().cloned(),
        after: node.after().cloned(),
        text_diff,
    }
}
