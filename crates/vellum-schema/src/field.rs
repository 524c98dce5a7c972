//! The closed set of field kinds a collection or global can declare.
//!
//! Configuration files describe fields with a `type` string. Known types map
//! onto the [`Field`] variants; anything else becomes [`Field::Unknown`] so
//! that loading a config never silently drops a field, and the diff engine
//! can refuse to compare it by name.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// Key under which a block row stores its variant slug.
pub const BLOCK_TYPE_KEY: &str = "blockType";

/// A field declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawField", into = "RawField")]
pub enum Field {
    /// A single value: text, number, date, rich text, ...
    Scalar(ScalarField),
    /// A named object of child fields.
    Group(GroupField),
    /// A list of rows, each row shaped by the same child fields.
    Array(ArrayField),
    /// A list of rows, each row shaped by the variant its discriminant selects.
    Blocks(BlocksField),
    /// A reference to one or more documents in other collections.
    Relationship(RelationshipField),
    /// Row / collapsible / unnamed tab: groups children visually, adds no path.
    Layout(LayoutField),
    /// Presentation-only pseudo-field that carries no data.
    Ui(UiField),
    /// A field type without a comparison strategy.
    Unknown(UnknownField),
}

impl Field {
    /// The data path segment, `None` for layout and UI fields.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Scalar(f) => Some(&f.name),
            Self::Group(f) => Some(&f.name),
            Self::Array(f) => Some(&f.name),
            Self::Blocks(f) => Some(&f.name),
            Self::Relationship(f) => Some(&f.name),
            Self::Unknown(f) => Some(&f.name),
            Self::Layout(_) | Self::Ui(_) => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Scalar(f) => f.label.as_deref(),
            Self::Group(f) => f.label.as_deref(),
            Self::Array(f) => f.label.as_deref(),
            Self::Blocks(f) => f.label.as_deref(),
            Self::Relationship(f) => f.label.as_deref(),
            Self::Layout(f) => f.label.as_deref(),
            Self::Unknown(f) => f.label.as_deref(),
            Self::Ui(_) => None,
        }
    }

    /// Whether the field stores one value per locale.
    pub fn localized(&self) -> bool {
        match self {
            Self::Scalar(f) => f.localized,
            Self::Group(f) => f.localized,
            Self::Array(f) => f.localized,
            Self::Blocks(f) => f.localized,
            Self::Relationship(f) => f.localized,
            Self::Unknown(f) => f.localized,
            Self::Layout(_) | Self::Ui(_) => false,
        }
    }

    /// Whether the field owns a key in the document data.
    pub fn affects_data(&self) -> bool {
        self.name().is_some()
    }

    /// Returns `true` for fields the walker reports as leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Scalar(_) | Self::Relationship(_) | Self::Unknown(_)
        )
    }

    /// The configuration `type` string.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Scalar(f) => f.kind.type_name(),
            Self::Group(_) => "group",
            Self::Array(_) => "array",
            Self::Blocks(_) => "blocks",
            Self::Relationship(f) if f.upload => "upload",
            Self::Relationship(_) => "relationship",
            Self::Layout(f) => f.kind.as_str(),
            Self::Ui(_) => "ui",
            Self::Unknown(f) => &f.type_name,
        }
    }
}

/// Value kinds stored by scalar fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Text,
    Textarea,
    Email,
    Code,
    Number,
    Checkbox,
    Date,
    Select,
    Radio,
    Point,
    Json,
    RichText,
}

impl ScalarKind {
    pub fn from_type_name(name: &str) -> Option<Self> {
        Some(match name {
            "text" => Self::Text,
            "textarea" => Self::Textarea,
            "email" => Self::Email,
            "code" => Self::Code,
            "number" => Self::Number,
            "checkbox" => Self::Checkbox,
            "date" => Self::Date,
            "select" => Self::Select,
            "radio" => Self::Radio,
            "point" => Self::Point,
            "json" => Self::Json,
            "richText" => Self::RichText,
            _ => return None,
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Email => "email",
            Self::Code => "code",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Point => "point",
            Self::Json => "json",
            Self::RichText => "richText",
        }
    }

    /// Plain-text kinds get a word-level diff when rendered.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text | Self::Textarea | Self::Email | Self::Code)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarField {
    pub name: String,
    pub label: Option<String>,
    pub localized: bool,
    pub kind: ScalarKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupField {
    pub name: String,
    pub label: Option<String>,
    pub localized: bool,
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayField {
    pub name: String,
    pub label: Option<String>,
    pub localized: bool,
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlocksField {
    pub name: String,
    pub label: Option<String>,
    pub localized: bool,
    pub blocks: Vec<BlockVariant>,
}

impl BlocksField {
    /// Look up a variant by slug.
    pub fn variant(&self, slug: &str) -> Option<&BlockVariant> {
        self.blocks.iter().find(|b| b.slug == slug)
    }

    /// The variant whose sub-schema applies to a block row, selected by the
    /// row's `blockType` discriminant.
    pub fn variant_for(&self, row: &Value) -> Option<&BlockVariant> {
        discriminant(row).and_then(|slug| self.variant(slug))
    }
}

/// Find the data field called `name` among `fields`, looking through
/// layout fields but not into groups or arrays.
pub fn find_field<'f>(fields: &'f [Field], name: &str) -> Option<&'f Field> {
    for field in fields {
        if let Field::Layout(layout) = field {
            if let Some(found) = find_field(&layout.fields, name) {
                return Some(found);
            }
        } else if field.name() == Some(name) {
            return Some(field);
        }
    }
    None
}

/// Read the `blockType` discriminant of a block row.
pub fn discriminant(row: &Value) -> Option<&str> {
    row.get(BLOCK_TYPE_KEY).and_then(Value::as_str)
}

/// One arm of a blocks field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockVariant {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Target collection(s) of a relationship.
///
/// A list, even of length one, makes the relationship polymorphic: stored
/// values then carry `{ relationTo, value }` pairs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationTo {
    One(String),
    Many(Vec<String>),
}

impl RelationTo {
    pub fn is_polymorphic(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    pub fn collections(&self) -> Vec<&str> {
        match self {
            Self::One(c) => vec![c.as_str()],
            Self::Many(cs) => cs.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipField {
    pub name: String,
    pub label: Option<String>,
    pub localized: bool,
    pub relation_to: RelationTo,
    pub has_many: bool,
    /// Upload fields are single relationships to an upload collection.
    pub upload: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutKind {
    Row,
    Collapsible,
    Tabs,
}

impl LayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Collapsible => "collapsible",
            Self::Tabs => "tabs",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutField {
    pub kind: LayoutKind,
    pub label: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UiField {
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnknownField {
    pub name: String,
    pub label: Option<String>,
    pub localized: bool,
    pub type_name: String,
}

// ---------------------------------------------------------------------------
// Configuration representation
// ---------------------------------------------------------------------------

/// One entry of a `tabs` field. Named tabs store their children under the
/// tab name, unnamed tabs are purely visual.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTab {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized: Option<bool>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Field as written in configuration files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub localized: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<BlockVariant>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<RawTab>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_to: Option<RelationTo>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_many: bool,
}

fn required_name(raw: &RawField) -> Result<String, SchemaError> {
    match raw.name.as_deref() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(SchemaError::MissingName {
            kind: raw.kind.clone(),
        }),
    }
}

impl TryFrom<RawField> for Field {
    type Error = SchemaError;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        if let Some(kind) = ScalarKind::from_type_name(&raw.kind) {
            return Ok(Self::Scalar(ScalarField {
                name: required_name(&raw)?,
                label: raw.label,
                localized: raw.localized,
                kind,
            }));
        }

        let field = match raw.kind.as_str() {
            "group" => Self::Group(GroupField {
                name: required_name(&raw)?,
                label: raw.label,
                localized: raw.localized,
                fields: raw.fields,
            }),
            "array" => Self::Array(ArrayField {
                name: required_name(&raw)?,
                label: raw.label,
                localized: raw.localized,
                fields: raw.fields,
            }),
            "blocks" => Self::Blocks(BlocksField {
                name: required_name(&raw)?,
                label: raw.label,
                localized: raw.localized,
                blocks: raw.blocks,
            }),
            "relationship" | "upload" => {
                let name = required_name(&raw)?;
                let relation_to = raw
                    .relation_to
                    .ok_or_else(|| SchemaError::MissingRelationTarget { path: name.clone() })?;
                Self::Relationship(RelationshipField {
                    name,
                    label: raw.label,
                    localized: raw.localized,
                    relation_to,
                    has_many: raw.has_many,
                    upload: raw.kind == "upload",
                })
            }
            "row" | "collapsible" => Self::Layout(LayoutField {
                kind: if raw.kind == "row" {
                    LayoutKind::Row
                } else {
                    LayoutKind::Collapsible
                },
                label: raw.label,
                fields: raw.fields,
            }),
            "tabs" => Self::Layout(LayoutField {
                kind: LayoutKind::Tabs,
                label: raw.label,
                fields: raw.tabs.into_iter().map(tab_to_field).collect(),
            }),
            "ui" => Self::Ui(UiField { name: raw.name }),
            _ => Self::Unknown(UnknownField {
                name: required_name(&raw)?,
                label: raw.label,
                localized: raw.localized,
                type_name: raw.kind,
            }),
        };
        Ok(field)
    }
}

fn tab_to_field(tab: RawTab) -> Field {
    match tab.name {
        Some(name) => Field::Group(GroupField {
            name,
            label: tab.label,
            localized: tab.localized.unwrap_or(false),
            fields: tab.fields,
        }),
        None => Field::Layout(LayoutField {
            kind: LayoutKind::Tabs,
            label: tab.label,
            fields: tab.fields,
        }),
    }
}

impl From<Field> for RawField {
    fn from(field: Field) -> Self {
        let kind = field.type_name().to_string();
        match field {
            Field::Scalar(f) => RawField {
                kind,
                name: Some(f.name),
                label: f.label,
                localized: f.localized,
                ..Default::default()
            },
            Field::Group(f) => RawField {
                kind,
                name: Some(f.name),
                label: f.label,
                localized: f.localized,
                fields: f.fields,
                ..Default::default()
            },
            Field::Array(f) => RawField {
                kind,
                name: Some(f.name),
                label: f.label,
                localized: f.localized,
                fields: f.fields,
                ..Default::default()
            },
            Field::Blocks(f) => RawField {
                kind,
                name: Some(f.name),
                label: f.label,
                localized: f.localized,
                blocks: f.blocks,
                ..Default::default()
            },
            Field::Relationship(f) => RawField {
                kind,
                name: Some(f.name),
                label: f.label,
                localized: f.localized,
                relation_to: Some(f.relation_to),
                has_many: f.has_many,
                ..Default::default()
            },
            // Tabs flatten into a layout of groups/layouts on load; they are
            // written back as a collapsible-equivalent layout.
            Field::Layout(f) => RawField {
                kind: match f.kind {
                    LayoutKind::Tabs => "collapsible".to_string(),
                    _ => kind,
                },
                label: f.label,
                fields: f.fields,
                ..Default::default()
            },
            Field::Ui(f) => RawField {
                kind,
                name: f.name,
                ..Default::default()
            },
            Field::Unknown(f) => RawField {
                kind,
                name: Some(f.name),
                label: f.label,
                localized: f.localized,
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<Field, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn scalar_types_map_to_scalar_kinds() {
        let field = parse(json!({"type": "date", "name": "publishedAt"})).unwrap();
        match field {
            Field::Scalar(f) => {
                assert_eq!(f.name, "publishedAt");
                assert_eq!(f.kind, ScalarKind::Date);
                assert!(!f.localized);
            }
            other => panic!("expected scalar, got {:?}", other),
        }
    }

    #[test]
    fn data_fields_require_a_name() {
        let err = parse(json!({"type": "text"})).unwrap_err();
        assert!(err.to_string().contains("requires a name"));
    }

    #[test]
    fn unknown_types_are_kept() {
        let field = parse(json!({"type": "colorPicker", "name": "accent"})).unwrap();
        assert_eq!(field.type_name(), "colorPicker");
        assert!(matches!(field, Field::Unknown(_)));
        assert!(field.is_leaf());
    }

    #[test]
    fn nested_containers_parse_recursively() {
        let field = parse(json!({
            "type": "array",
            "name": "slides",
            "fields": [
                {"type": "text", "name": "caption", "localized": true},
                {"type": "upload", "name": "image", "relationTo": "media"}
            ]
        }))
        .unwrap();
        let Field::Array(array) = field else {
            panic!("expected array");
        };
        assert_eq!(array.fields.len(), 2);
        assert!(array.fields[0].localized());
        assert_eq!(array.fields[1].type_name(), "upload");
    }

    #[test]
    fn polymorphic_relationship() {
        let field = parse(json!({
            "type": "relationship",
            "name": "related",
            "relationTo": ["posts", "pages"],
            "hasMany": true
        }))
        .unwrap();
        let Field::Relationship(rel) = field else {
            panic!("expected relationship");
        };
        assert!(rel.relation_to.is_polymorphic());
        assert!(rel.has_many);
        assert_eq!(rel.relation_to.collections(), vec!["posts", "pages"]);
    }

    #[test]
    fn relationship_requires_target() {
        let err = parse(json!({"type": "relationship", "name": "author"})).unwrap_err();
        assert!(err.to_string().contains("no target collection"));
    }

    #[test]
    fn layout_and_ui_have_no_data_path() {
        let row = parse(json!({"type": "row", "fields": [{"type": "text", "name": "a"}]})).unwrap();
        let ui = parse(json!({"type": "ui", "name": "preview"})).unwrap();
        assert!(!row.affects_data());
        assert!(!ui.affects_data());
        assert!(!ui.is_leaf());
    }

    #[test]
    fn named_tabs_become_groups() {
        let field = parse(json!({
            "type": "tabs",
            "tabs": [
                {"label": "Content", "fields": [{"type": "text", "name": "body"}]},
                {"name": "seo", "fields": [{"type": "text", "name": "description"}]}
            ]
        }))
        .unwrap();
        let Field::Layout(layout) = field else {
            panic!("expected layout");
        };
        assert!(matches!(layout.fields[0], Field::Layout(_)));
        assert_eq!(layout.fields[1].name(), Some("seo"));
    }

    #[test]
    fn find_field_sees_through_layouts() {
        let fields: Vec<Field> = serde_json::from_value(json!([
            {"type": "row", "fields": [{"type": "text", "name": "title"}]},
            {"type": "group", "name": "meta", "fields": [{"type": "text", "name": "slug"}]}
        ]))
        .unwrap();
        assert_eq!(find_field(&fields, "title").map(Field::type_name), Some("text"));
        assert_eq!(find_field(&fields, "meta").map(Field::type_name), Some("group"));
        assert!(find_field(&fields, "slug").is_none());
    }

    #[test]
    fn block_variant_lookup_by_discriminant() {
        let field = parse(json!({
            "type": "blocks",
            "name": "layout",
            "blocks": [
                {"slug": "quote", "fields": [{"type": "text", "name": "text"}]},
                {"slug": "image", "fields": [{"type": "upload", "name": "media", "relationTo": "media"}]}
            ]
        }))
        .unwrap();
        let Field::Blocks(blocks) = field else {
            panic!("expected blocks");
        };
        let row = json!({"blockType": "image", "media": "m1"});
        assert_eq!(blocks.variant_for(&row).map(|v| v.slug.as_str()), Some("image"));
        assert!(blocks.variant_for(&json!({"blockType": "video"})).is_none());
        assert!(blocks.variant_for(&json!({"text": "x"})).is_none());
    }

    #[test]
    fn serialize_roundtrip_preserves_shape() {
        let original = parse(json!({
            "type": "group",
            "name": "meta",
            "localized": true,
            "fields": [{"type": "richText", "name": "summary"}]
        }))
        .unwrap();
        let value = serde_json::to_value(&original).unwrap();
        assert_eq!(value["type"], "group");
        assert_eq!(value["fields"][0]["type"], "richText");
        let reparsed = parse(value).unwrap();
        assert_eq!(original, reparsed);
    }
}
