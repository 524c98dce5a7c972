//! Leaf-by-leaf traversal of a field schema.
//!
//! [`walk`] validates a schema and returns a [`SchemaWalk`], a lazy iterator
//! over every data-carrying leaf in declaration order. UI fields are skipped,
//! layout containers are flattened into their parent level, and each block
//! variant contributes its own sub-tree under a [`crate::PathSegment::Variant`]
//! segment, so a variant's leaves only ever apply to rows whose `blockType`
//! names that variant.

use std::collections::HashSet;
use std::slice;

use crate::error::{SchemaError, SchemaResult};
use crate::field::{Field, BLOCK_TYPE_KEY};
use crate::path::FieldPath;

/// A leaf reached by the walker.
#[derive(Clone, Debug)]
pub struct WalkedField<'a> {
    /// Schema path of the leaf (containers and variants included).
    pub path: FieldPath,
    /// The leaf declaration.
    pub field: &'a Field,
    /// `true` if the leaf or any enclosing container is localized.
    pub localized: bool,
}

#[derive(Clone, Debug)]
struct Frame<'a> {
    fields: slice::Iter<'a, Field>,
    prefix: FieldPath,
    localized: bool,
}

/// Lazy traversal of the leaves of a schema.
///
/// The walk is finite and cheap to restart: clone it before consuming, or
/// call [`walk`] again.
#[derive(Clone, Debug)]
pub struct SchemaWalk<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> SchemaWalk<'a> {
    fn new(fields: &'a [Field]) -> Self {
        Self {
            stack: vec![Frame {
                fields: fields.iter(),
                prefix: FieldPath::root(),
                localized: false,
            }],
        }
    }
}

impl<'a> Iterator for SchemaWalk<'a> {
    type Item = WalkedField<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(field) = frame.fields.next() else {
                self.stack.pop();
                continue;
            };
            let prefix = frame.prefix.clone();
            let inherited = frame.localized;

            match field {
                Field::Ui(_) => continue,
                Field::Layout(layout) => self.stack.push(Frame {
                    fields: layout.fields.iter(),
                    prefix,
                    localized: inherited,
                }),
                Field::Group(group) => self.stack.push(Frame {
                    fields: group.fields.iter(),
                    prefix: prefix.field(&group.name),
                    localized: inherited || group.localized,
                }),
                Field::Array(array) => self.stack.push(Frame {
                    fields: array.fields.iter(),
                    prefix: prefix.field(&array.name),
                    localized: inherited || array.localized,
                }),
                Field::Blocks(blocks) => {
                    let base = prefix.field(&blocks.name);
                    let localized = inherited || blocks.localized;
                    // Reverse so the first declared variant is walked first.
                    for variant in blocks.blocks.iter().rev() {
                        self.stack.push(Frame {
                            fields: variant.fields.iter(),
                            prefix: base.variant(&variant.slug),
                            localized,
                        });
                    }
                }
                Field::Scalar(_) | Field::Relationship(_) | Field::Unknown(_) => {
                    let name = field.name().unwrap_or_default();
                    return Some(WalkedField {
                        path: prefix.field(name),
                        field,
                        localized: inherited || field.localized(),
                    });
                }
            }
        }
    }
}

/// Validate a schema and return a walk over its leaves.
///
/// # Errors
///
/// Returns a [`SchemaError`] if the schema is malformed; see [`validate`].
pub fn walk(fields: &[Field]) -> SchemaResult<SchemaWalk<'_>> {
    validate(fields)?;
    Ok(SchemaWalk::new(fields))
}

/// Check the structural invariants the diff engine relies on.
///
/// - sibling data paths are unique, including across flattened layouts
/// - every blocks field declares at least one variant
/// - variant slugs are unique within a blocks field
/// - no variant declares a field named like the `blockType` discriminant
pub fn validate(fields: &[Field]) -> SchemaResult<()> {
    validate_level(fields, &FieldPath::root(), &mut HashSet::new())
}

fn validate_level(
    fields: &[Field],
    prefix: &FieldPath,
    seen: &mut HashSet<String>,
) -> SchemaResult<()> {
    for field in fields {
        if let Field::Layout(layout) = field {
            validate_level(&layout.fields, prefix, seen)?;
            continue;
        }
        let Some(name) = field.name() else {
            continue;
        };
        let path = prefix.field(name);
        if !seen.insert(name.to_string()) {
            return Err(SchemaError::DuplicatePath {
                path: path.to_string(),
            });
        }

        match field {
            Field::Group(group) => validate_level(&group.fields, &path, &mut HashSet::new())?,
            Field::Array(array) => validate_level(&array.fields, &path, &mut HashSet::new())?,
            Field::Blocks(blocks) => {
                if blocks.blocks.is_empty() {
                    return Err(SchemaError::EmptyBlocks {
                        path: path.to_string(),
                    });
                }
                let mut slugs = HashSet::new();
                for variant in &blocks.blocks {
                    if !slugs.insert(variant.slug.as_str()) {
                        return Err(SchemaError::DuplicateVariant {
                            path: path.to_string(),
                            slug: variant.slug.clone(),
                        });
                    }
                    let variant_path = path.variant(&variant.slug);
                    let mut variant_seen = HashSet::new();
                    validate_level(&variant.fields, &variant_path, &mut variant_seen)?;
                    if variant_seen.contains(BLOCK_TYPE_KEY) {
                        return Err(SchemaError::DiscriminantCollision {
                            path: variant_path.field(BLOCK_TYPE_KEY).to_string(),
                            discriminant: BLOCK_TYPE_KEY.to_string(),
                        });
                    }
                }
            }
            Field::Relationship(rel) => {
                if rel.relation_to.collections().is_empty() {
                    return Err(SchemaError::MissingRelationTarget {
                        path: path.to_string(),
                    });
                }
            }
            _ => {}
        }
    }
    Ok(())
}
