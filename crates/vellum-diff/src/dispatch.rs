//! Field diff dispatcher.
//!
//! Every field kind has exactly one comparison strategy, selected by an
//! exhaustive match over [`Field`]. The direction convention is fixed:
//! `base` is the version under inspection and `comparison` the compare
//! target, so a value found only in `base` is `Removed` and a value found
//! only in `comparison` is `Added`. JSON `null` counts as absent.

use serde_json::{json, Value};
use vellum_schema::field::discriminant;
use vellum_schema::{
    validate, ArrayField, BlocksField, Field, FieldPath, RelationshipField, ScalarField,
    ScalarKind,
};
use vellum_types::{instant_from_value, DocumentData, DocumentId};

use crate::error::{DiffError, DiffResult};
use crate::locale::{expand, LocaleSet};
use crate::node::{DiffNode, DiffTree, NodeKind};

/// Traversal state shared by one comparison.
#[derive(Clone, Copy)]
struct Scope<'a> {
    locales: &'a LocaleSet,
    /// Cleared below a localized field: its children share the locale split.
    fan_out: bool,
}

/// Diff two snapshots' field data against a schema.
///
/// The schema is validated first. Produces one node per top-level data
/// field in declaration order, with layout fields flattened and UI fields
/// skipped.
pub fn diff_document(
    fields: &[Field],
    base: &DocumentData,
    comparison: &DocumentData,
    locales: &LocaleSet,
) -> DiffResult<DiffTree> {
    validate(fields)?;
    let scope = Scope {
        locales,
        fan_out: true,
    };
    let mut nodes = Vec::new();
    diff_fields(fields, &FieldPath::root(), Some(base), Some(comparison), scope, &mut nodes)?;
    Ok(DiffTree::new(nodes))
}

/// Diff one named field, fanning localized values out per locale.
pub fn diff_field(
    field: &Field,
    path: FieldPath,
    base: Option<&Value>,
    comparison: Option<&Value>,
    locales: &LocaleSet,
) -> DiffResult<DiffNode> {
    let scope = Scope {
        locales,
        fan_out: true,
    };
    field_node(field, path, base, comparison, scope)
}

/// Diff one value of a field (a single locale, or an unlocalized value).
pub fn diff(
    field: &Field,
    path: FieldPath,
    base: Option<&Value>,
    comparison: Option<&Value>,
    locales: &LocaleSet,
) -> DiffResult<DiffNode> {
    let scope = Scope {
        locales,
        fan_out: true,
    };
    value_node(field, path, base, comparison, scope)
}

fn diff_fields(
    fields: &[Field],
    prefix: &FieldPath,
    base: Option<&DocumentData>,
    comparison: Option<&DocumentData>,
    scope: Scope<'_>,
    out: &mut Vec<DiffNode>,
) -> DiffResult<()> {
    for field in fields {
        match field {
            Field::Ui(_) => {}
            Field::Layout(layout) => {
                diff_fields(&layout.fields, prefix, base, comparison, scope, out)?;
            }
            _ => {
                let Some(name) = field.name() else {
                    continue;
                };
                out.push(field_node(
                    field,
                    prefix.field(name),
                    base.and_then(|m| m.get(name)),
                    comparison.and_then(|m| m.get(name)),
                    scope,
                )?);
            }
        }
    }
    Ok(())
}

fn field_node(
    field: &Field,
    path: FieldPath,
    base: Option<&Value>,
    comparison: Option<&Value>,
    scope: Scope<'_>,
) -> DiffResult<DiffNode> {
    if !(scope.fan_out && field.localized() && scope.locales.is_enabled()) {
        return value_node(field, path, base, comparison, scope);
    }
    let per_locale = |v: Option<&Value>| matches!(present(v), None | Some(Value::Object(_)));
    if !per_locale(base) || !per_locale(comparison) {
        return Ok(wholesale(path, NodeKind::Field, base, comparison));
    }
    let inner = Scope {
        fan_out: false,
        ..scope
    };
    let children = expand(field, present(base), present(comparison), scope.locales)
        .into_iter()
        .map(|pair| {
            let node = value_node(field, path.clone(), pair.base, pair.comparison, inner)?;
            Ok(match pair.locale {
                Some(locale) => node.into_locale(locale),
                None => node,
            })
        })
        .collect::<DiffResult<Vec<_>>>()?;
    Ok(DiffNode::container(path, NodeKind::Field, children))
}

fn value_node(
    field: &Field,
    path: FieldPath,
    base: Option<&Value>,
    comparison: Option<&Value>,
    scope: Scope<'_>,
) -> DiffResult<DiffNode> {
    let base = present(base);
    let comparison = present(comparison);
    match field {
        Field::Scalar(scalar) => Ok(scalar_node(scalar, path, base, comparison)),
        Field::Relationship(relationship) => {
            Ok(relationship_node(relationship, path, base, comparison))
        }
        Field::Group(group) => match (as_object(base), as_object(comparison)) {
            (Ok(b), Ok(c)) => {
                let mut children = Vec::new();
                diff_fields(&group.fields, &path, b, c, scope, &mut children)?;
                Ok(DiffNode::container(path, NodeKind::Field, children))
            }
            _ => Ok(wholesale(path, NodeKind::Field, base, comparison)),
        },
        Field::Array(array) => array_node(array, path, base, comparison, scope),
        Field::Blocks(blocks) => blocks_node(blocks, path, base, comparison, scope),
        Field::Layout(layout) => {
            // A layout has no value of its own; its children live in the
            // object the caller handed in.
            let (Ok(b), Ok(c)) = (as_object(base), as_object(comparison)) else {
                return Ok(wholesale(path, NodeKind::Field, base, comparison));
            };
            let mut children = Vec::new();
            diff_fields(&layout.fields, &path, b, c, scope, &mut children)?;
            Ok(DiffNode::container(path, NodeKind::Field, children))
        }
        Field::Ui(_) => Ok(DiffNode::leaf(path, NodeKind::Field, None, None, true)),
        Field::Unknown(unknown) => Err(DiffError::UnsupportedField {
            path: path.to_string(),
            kind: unknown.type_name.clone(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Leaves
// ---------------------------------------------------------------------------

fn scalar_node(
    scalar: &ScalarField,
    path: FieldPath,
    base: Option<&Value>,
    comparison: Option<&Value>,
) -> DiffNode {
    let equal = match (base, comparison) {
        (Some(b), Some(c)) => scalar_equal(scalar.kind, b, c),
        _ => false,
    };
    DiffNode::leaf(path, NodeKind::Field, base.cloned(), comparison.cloned(), equal)
}

fn scalar_equal(kind: ScalarKind, a: &Value, b: &Value) -> bool {
    match kind {
        ScalarKind::Date => match (instant_from_value(a), instant_from_value(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        ScalarKind::Number => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        _ => a == b,
    }
}

fn relationship_node(
    relationship: &RelationshipField,
    path: FieldPath,
    base: Option<&Value>,
    comparison: Option<&Value>,
) -> DiffNode {
    let equal = match (base, comparison) {
        (Some(b), Some(c)) => reference_key(relationship, b) == reference_key(relationship, c),
        _ => false,
    };
    DiffNode::leaf(path, NodeKind::Field, base.cloned(), comparison.cloned(), equal)
}

/// Reduce a stored relationship value to what identifies its target(s).
///
/// Populated documents collapse to their `id`; polymorphic values keep
/// their collection tag.
fn reference_key(relationship: &RelationshipField, value: &Value) -> Value {
    match value {
        Value::Array(items) if relationship.has_many => Value::Array(
            items
                .iter()
                .map(|item| single_reference_key(relationship, item))
                .collect(),
        ),
        other => single_reference_key(relationship, other),
    }
}

fn single_reference_key(relationship: &RelationshipField, value: &Value) -> Value {
    if relationship.relation_to.is_polymorphic() {
        if let Some(collection) = value.get("relationTo") {
            let target = value.get("value").map(reference_id).unwrap_or(Value::Null);
            return json!({ "relationTo": collection, "value": target });
        }
    }
    reference_id(value)
}

fn reference_id(value: &Value) -> Value {
    let id = match value {
        Value::Object(document) => document.get("id").unwrap_or(value),
        other => other,
    };
    DocumentId::from_value(id)
        .map(|id| Value::String(id.as_str().to_string()))
        .unwrap_or_else(|| id.clone())
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

fn array_node(
    array: &ArrayField,
    path: FieldPath,
    base: Option<&Value>,
    comparison: Option<&Value>,
    scope: Scope<'_>,
) -> DiffResult<DiffNode> {
    let (Ok(base_rows), Ok(comparison_rows)) = (as_rows(base), as_rows(comparison)) else {
        return Ok(wholesale(path, NodeKind::Field, base, comparison));
    };

    let mut rows = Vec::with_capacity(base_rows.len().max(comparison_rows.len()));
    for index in 0..base_rows.len().max(comparison_rows.len()) {
        let row_path = path.index(index);
        let node = match (base_rows.get(index), comparison_rows.get(index)) {
            (Some(Value::Object(b)), Some(Value::Object(c))) => {
                let mut children = Vec::new();
                diff_fields(&array.fields, &row_path, Some(b), Some(c), scope, &mut children)?;
                DiffNode::container(row_path, NodeKind::Row, children)
            }
            (b, c) => wholesale(row_path, NodeKind::Row, b, c),
        };
        rows.push(node);
    }
    Ok(DiffNode::container(path, NodeKind::Field, rows))
}

fn blocks_node(
    blocks: &BlocksField,
    path: FieldPath,
    base: Option<&Value>,
    comparison: Option<&Value>,
    scope: Scope<'_>,
) -> DiffResult<DiffNode> {
    let (Ok(base_rows), Ok(comparison_rows)) = (as_rows(base), as_rows(comparison)) else {
        return Ok(wholesale(path, NodeKind::Field, base, comparison));
    };

    let mut rows = Vec::new();
    for index in 0..base_rows.len().max(comparison_rows.len()) {
        let row_path = path.index(index);
        let (b, c) = (base_rows.get(index), comparison_rows.get(index));
        let (b_type, c_type) = (b.and_then(discriminant), c.and_then(discriminant));

        match (b, c) {
            (Some(b), Some(c)) if b_type != c_type => {
                // Different variants share no sub-schema: the base block is
                // removed and the comparison block added in its place.
                let removed = wholesale(row_path.clone(), NodeKind::Row, Some(b), None);
                let added = wholesale(row_path, NodeKind::Row, None, Some(c));
                rows.push(removed.with_block_type(b_type));
                rows.push(added.with_block_type(c_type));
            }
            (Some(b), Some(c)) => {
                let node = match (b, c, blocks.variant_for(c)) {
                    (Value::Object(bo), Value::Object(co), Some(variant)) => {
                        let mut children = Vec::new();
                        diff_fields(
                            &variant.fields,
                            &row_path,
                            Some(bo),
                            Some(co),
                            scope,
                            &mut children,
                        )?;
                        DiffNode::container(row_path, NodeKind::Row, children)
                    }
                    _ => wholesale(row_path, NodeKind::Row, Some(b), Some(c)),
                };
                rows.push(node.with_block_type(c_type));
            }
            (b, c) => {
                let block_type = b_type.or(c_type);
                rows.push(wholesale(row_path, NodeKind::Row, b, c).with_block_type(block_type));
            }
        }
    }
    Ok(DiffNode::container(path, NodeKind::Field, rows))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `null` is treated as absent.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Compare two values by deep equality, without consulting the schema.
fn wholesale(
    path: FieldPath,
    kind: NodeKind,
    base: Option<&Value>,
    comparison: Option<&Value>,
) -> DiffNode {
    let base = present(base);
    let comparison = present(comparison);
    DiffNode::leaf(path, kind, base.cloned(), comparison.cloned(), base == comparison)
}

/// `Err(())` when the value exists but is not an object.
fn as_object(value: Option<&Value>) -> Result<Option<&DocumentData>, ()> {
    match value {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(()),
    }
}

/// `Err(())` when the value exists but is not an array.
fn as_rows(value: Option<&Value>) -> Result<&[Value], ()> {
    match value {
        None => Ok(&[]),
        Some(Value::Array(rows)) => Ok(rows),
        Some(_) => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ChangeKind;
    use proptest::prelude::*;
    use vellum_types::LocaleCode;

    fn schema(value: Value) -> Vec<Field> {
        serde_json::from_value(value).unwrap()
    }

    fn data(value: Value) -> DocumentData {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn locales(codes: &[&str]) -> LocaleSet {
        LocaleSet::new(codes.iter().map(|c| LocaleCode::new(*c).unwrap()).collect())
    }

    fn sample_schema() -> Vec<Field> {
        schema(json!([
            {"type": "text", "name": "title", "localized": true},
            {"type": "number", "name": "rating"},
            {"type": "date", "name": "publishedAt"},
            {"type": "array", "name": "tags", "fields": [{"type": "text", "name": "tag"}]},
            {"type": "row", "fields": [
                {"type": "checkbox", "name": "featured"},
                {"type": "ui", "name": "preview"}
            ]},
            {"type": "group", "name": "meta", "fields": [
                {"type": "textarea", "name": "description", "localized": true}
            ]},
            {"type": "blocks", "name": "layout", "blocks": [
                {"slug": "quote", "fields": [{"type": "text", "name": "text"}]},
                {"slug": "image", "fields": [{"type": "upload", "name": "media", "relationTo": "media"}]}
            ]},
            {"type": "relationship", "name": "author", "relationTo": "users"},
            {"type": "relationship", "name": "related", "relationTo": ["posts", "pages"], "hasMany": true}
        ]))
    }

    #[test]
    fn scalar_modified_carries_both_values() {
        let fields = schema(json!([{"type": "text", "name": "title"}]));
        let tree = diff_document(
            &fields,
            &data(json!({"title": "Hello"})),
            &data(json!({"title": "Hello World"})),
            &LocaleSet::disabled(),
        )
        .unwrap();
        let node = &tree.nodes()[0];
        assert_eq!(node.change(), ChangeKind::Modified);
        assert_eq!(node.before(), Some(&json!("Hello")));
        assert_eq!(node.after(), Some(&json!("Hello World")));
    }

    #[test]
    fn array_pairs_rows_by_position() {
        let fields = schema(json!([{"type": "array", "name": "tags", "fields": []}]));
        let tree = diff_document(
            &fields,
            &data(json!({"tags": ["a", "b"]})),
            &data(json!({"tags": ["a", "b", "c"]})),
            &LocaleSet::disabled(),
        )
        .unwrap();
        let rows = tree.nodes()[0].children();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].change(), ChangeKind::Unchanged);
        assert_eq!(rows[1].change(), ChangeKind::Unchanged);
        assert_eq!(rows[2].change(), ChangeKind::Added);
        assert_eq!(rows[2].after(), Some(&json!("c")));
        assert_eq!(rows[2].path().to_string(), "tags.2");
    }

    #[test]
    fn block_variant_change_is_remove_plus_add() {
        let fields = sample_schema();
        let quote = json!({"blockType": "quote", "text": "To be"});
        let image = json!({"blockType": "image", "media": "m1"});
        let tree = diff_document(
            &fields,
            &data(json!({"layout": [quote.clone()]})),
            &data(json!({"layout": [image.clone()]})),
            &LocaleSet::disabled(),
        )
        .unwrap();
        let rows = tree.find("layout", None).unwrap().children();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].change(), ChangeKind::Removed);
        assert_eq!(rows[0].before(), Some(&quote));
        assert_eq!(rows[0].block_type(), Some("quote"));
        assert!(rows[0].is_leaf());
        assert_eq!(rows[1].change(), ChangeKind::Added);
        assert_eq!(rows[1].after(), Some(&image));
        assert!(rows[1].is_leaf());
    }

    #[test]
    fn matching_blocks_recurse_into_variant() {
        let fields = sample_schema();
        let tree = diff_document(
            &fields,
            &data(json!({"layout": [{"blockType": "quote", "text": "To be"}]})),
            &data(json!({"layout": [{"blockType": "quote", "text": "Not to be"}]})),
            &LocaleSet::disabled(),
        )
        .unwrap();
        let text = tree.find("layout.0.text", None).unwrap();
        assert_eq!(text.change(), ChangeKind::Modified);
        assert_eq!(tree.find("layout.0", None).unwrap().block_type(), Some("quote"));
    }

    #[test]
    fn undeclared_block_variant_is_compared_wholesale() {
        let fields = sample_schema();
        let video = json!({"blockType": "video", "url": "a"});
        let tree = diff_document(
            &fields,
            &data(json!({"layout": [video.clone()]})),
            &data(json!({"layout": [video]})),
            &LocaleSet::disabled(),
        )
        .unwrap();
        let row = tree.find("layout.0", None).unwrap();
        assert!(row.is_leaf());
        assert_eq!(row.change(), ChangeKind::Unchanged);
    }

    #[test]
    fn populated_relationship_compares_by_id() {
        let fields = sample_schema();
        let tree = diff_document(
            &fields,
            &data(json!({"author": {"id": 42, "title": "Old title"}})),
            &data(json!({"author": {"id": "42", "title": "New title"}})),
            &LocaleSet::disabled(),
        )
        .unwrap();
        assert_eq!(tree.find("author", None).unwrap().change(), ChangeKind::Unchanged);
    }

    #[test]
    fn polymorphic_has_many_keeps_collection_and_order() {
        let fields = sample_schema();
        let base = json!({"related": [
            {"relationTo": "posts", "value": "1"},
            {"relationTo": "pages", "value": {"id": "2", "title": "About"}}
        ]});
        let same = json!({"related": [
            {"relationTo": "posts", "value": {"id": "1"}},
            {"relationTo": "pages", "value": "2"}
        ]});
        let other_collection = json!({"related": [
            {"relationTo": "pages", "value": "1"},
            {"relationTo": "pages", "value": "2"}
        ]});
        let reordered = json!({"related": [
            {"relationTo": "pages", "value": "2"},
            {"relationTo": "posts", "value": "1"}
        ]});
        let run = |c: &Value| {
            diff_document(&fields, &data(base.clone()), &data(c.clone()), &LocaleSet::disabled())
                .unwrap()
                .find("related", None)
                .unwrap()
                .change()
        };
        assert_eq!(run(&same), ChangeKind::Unchanged);
        assert_eq!(run(&other_collection), ChangeKind::Modified);
        assert_eq!(run(&reordered), ChangeKind::Modified);
    }

    #[test]
    fn dates_and_numbers_normalize() {
        let fields = sample_schema();
        let tree = diff_document(
            &fields,
            &data(json!({"rating": 1, "publishedAt": "2024-03-01T10:00:00+02:00"})),
            &data(json!({"rating": 1.0, "publishedAt": "2024-03-01T08:00:00.000Z"})),
            &LocaleSet::disabled(),
        )
        .unwrap();
        assert_eq!(tree.find("rating", None).unwrap().change(), ChangeKind::Unchanged);
        assert_eq!(tree.find("publishedAt", None).unwrap().change(), ChangeKind::Unchanged);
    }

    #[test]
    fn null_counts_as_absent() {
        let fields = sample_schema();
        let tree = diff_document(
            &fields,
            &data(json!({"rating": null})),
            &data(json!({"rating": 3})),
            &LocaleSet::disabled(),
        )
        .unwrap();
        let node = tree.find("rating", None).unwrap();
        assert_eq!(node.change(), ChangeKind::Added);
        assert!(node.before().is_none());
    }

    #[test]
    fn localized_fields_fan_out_in_order() {
        let fields = sample_schema();
        let tree = diff_document(
            &fields,
            &data(json!({
                "title": {"en": "Hello", "de": "Hallo"},
                "meta": {"description": {"en": "x"}}
            })),
            &data(json!({
                "title": {"en": "Hello", "de": "Servus"},
                "meta": {"description": {"en": "y"}}
            })),
            &locales(&["de", "en"]),
        )
        .unwrap();
        let title = tree.find("title", None).unwrap();
        assert_eq!(title.change(), ChangeKind::Modified);
        let per_locale: Vec<(&str, ChangeKind)> = title
            .children()
            .iter()
            .map(|c| (c.locale().map(LocaleCode::as_str).unwrap_or(""), c.change()))
            .collect();
        assert_eq!(
            per_locale,
            vec![("de", ChangeKind::Modified), ("en", ChangeKind::Unchanged)]
        );
        let description = |locale| tree.find("meta.description", Some(locale)).unwrap().change();
        assert_eq!(description("en"), ChangeKind::Modified);
        assert_eq!(description("de"), ChangeKind::Unchanged);
    }

    #[test]
    fn localized_field_with_no_selected_locale_has_no_locale_rows() {
        let fields = sample_schema();
        let tree = diff_document(
            &fields,
            &data(json!({"title": {"en": "A", "de": "B"}})),
            &data(json!({"title": {"en": "A2", "de": "B"}})),
            &locales(&[]),
        )
        .unwrap();
        let title = tree.find("title", None).unwrap();
        assert!(title.children().is_empty());
        assert_eq!(title.change(), ChangeKind::Unchanged);
        assert!(title.before().is_none());
    }

    #[test]
    fn single_value_diff_reports_modified_text() {
        let field = &sample_schema()[0];
        let before = json!("Hello");
        let after = json!("Hello World");
        let node = diff(
            field,
            FieldPath::root().field("title"),
            Some(&before),
            Some(&after),
            &locales(&["en"]),
        )
        .unwrap();
        assert!(node.is_leaf());
        assert!(node.locale().is_none());
        assert_eq!(node.change(), ChangeKind::Modified);
        assert_eq!(node.before(), Some(&before));
        assert_eq!(node.after(), Some(&after));
    }

    #[test]
    fn field_diff_fans_localized_values_out() {
        let field = &sample_schema()[0];
        let before = json!({"en": "Hello", "de": "Hallo"});
        let after = json!({"en": "Hello", "de": "Servus", "fr": "Salut"});
        let node = diff_field(
            field,
            FieldPath::root().field("title"),
            Some(&before),
            Some(&after),
            &locales(&["en", "de", "fr"]),
        )
        .unwrap();
        let per_locale: Vec<(&str, ChangeKind)> = node
            .children()
            .iter()
            .map(|c| (c.locale().map(LocaleCode::as_str).unwrap_or(""), c.change()))
            .collect();
        assert_eq!(
            per_locale,
            vec![
                ("en", ChangeKind::Unchanged),
                ("de", ChangeKind::Modified),
                ("fr", ChangeKind::Added),
            ]
        );
        assert_eq!(node.change(), ChangeKind::Modified);
    }

    #[test]
    fn layout_is_flattened_and_ui_skipped() {
        let fields = sample_schema();
        let empty = DocumentData::new();
        let tree = diff_document(&fields, &empty, &empty, &LocaleSet::disabled()).unwrap();
        let names: Vec<String> = tree.nodes().iter().map(|n| n.path().to_string()).collect();
        assert!(names.contains(&"featured".to_string()));
        assert!(!names.contains(&"preview".to_string()));
        assert!(tree.is_unchanged());
    }

    #[test]
    fn unknown_field_fails_with_path() {
        let fields = schema(json!([
            {"type": "group", "name": "meta", "fields": [{"type": "colorPicker", "name": "accent"}]}
        ]));
        let err = diff_document(&fields, &DocumentData::new(), &DocumentData::new(), &LocaleSet::disabled())
            .unwrap_err();
        assert_eq!(
            err,
            DiffError::UnsupportedField {
                path: "meta.accent".into(),
                kind: "colorPicker".into()
            }
        );
    }

    #[test]
    fn invalid_schema_is_rejected() {
        let fields = schema(json!([{"type": "blocks", "name": "layout", "blocks": []}]));
        let err = diff_document(&fields, &DocumentData::new(), &DocumentData::new(), &LocaleSet::disabled())
            .unwrap_err();
        assert!(matches!(err, DiffError::Schema(_)));
    }

    #[test]
    fn shape_mismatch_is_compared_wholesale() {
        let fields = sample_schema();
        let tree = diff_document(
            &fields,
            &data(json!({"meta": "legacy string", "tags": {"not": "rows"}})),
            &data(json!({"meta": {"description": {"en": "x"}}, "tags": {"not": "rows"}})),
            &LocaleSet::disabled(),
        )
        .unwrap();
        let meta = tree.find("meta", None).unwrap();
        assert!(meta.is_leaf());
        assert_eq!(meta.change(), ChangeKind::Modified);
        assert_eq!(tree.find("tags", None).unwrap().change(), ChangeKind::Unchanged);
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn leaves(tree: &DiffTree, flip: bool) -> Vec<String> {
        let mut out: Vec<String> = tree
            .iter()
            .filter(|n| n.is_leaf())
            .map(|n| {
                let (change, before, after) = if flip {
                    (n.change().flipped(), n.after(), n.before())
                } else {
                    (n.change(), n.before(), n.after())
                };
                format!(
                    "{}|{:?}|{:?}|{:?}|{:?}|{:?}",
                    n.path(),
                    n.locale(),
                    n.block_type(),
                    change,
                    before,
                    after
                )
            })
            .collect();
        out.sort();
        out
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (0i64..5).prop_map(Value::from),
            "[a-c]{0,2}".prop_map(Value::from),
            Just(json!("2024-03-01T10:00:00Z")),
            Just(json!({"blockType": "quote", "text": "a"})),
            Just(json!({"blockType": "image", "media": "m1"})),
            Just(json!({"relationTo": "posts", "value": "1"})),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                proptest::collection::btree_map("(en|de|tag|text|description)", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_document() -> impl Strategy<Value = DocumentData> {
        let names = [
            "title", "rating", "publishedAt", "tags", "featured", "meta", "layout", "author", "related",
        ];
        proptest::collection::vec(proptest::option::of(arb_value()), names.len()).prop_map(move |values| {
            names
                .iter()
                .zip(values)
                .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn self_diff_is_unchanged(doc in arb_document()) {
            let fields = sample_schema();
            let tree = diff_document(&fields, &doc, &doc, &locales(&["en", "de"])).unwrap();
            prop_assert!(tree.is_unchanged());
            prop_assert!(tree.iter().all(|n| n.change() == ChangeKind::Unchanged));
        }

        #[test]
        fn swapping_sides_flips_direction(a in arb_document(), b in arb_document()) {
            let fields = sample_schema();
            let set = locales(&["en", "de"]);
            let forward = diff_document(&fields, &a, &b, &set).unwrap();
            let backward = diff_document(&fields, &b, &a, &set).unwrap();
            prop_assert_eq!(leaves(&forward, false), leaves(&backward, true));
            prop_assert_eq!(forward.counts().modified, backward.counts().modified);
            prop_assert_eq!(forward.counts().added, backward.counts().removed);
        }
    }
}
