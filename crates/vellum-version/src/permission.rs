//! Access control for version comparisons.
//!
//! A [`PermissionProvider`] answers whether the caller may read or update an
//! entity and which fields it may see. Unreadable fields are pruned from the
//! schema with [`filter_fields`] before anything is diffed, so their values
//! never reach the output.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vellum_schema::Field;
use vellum_types::EntityRef;

use crate::error::VersionResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Update,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Update => f.write_str("update"),
        }
    }
}

/// What a permission applies to: a whole collection or a global.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Collection(String),
    Global(String),
}

impl From<&EntityRef> for Scope {
    fn from(entity: &EntityRef) -> Self {
        match entity {
            EntityRef::Collection { slug, .. } => Self::Collection(slug.clone()),
            EntityRef::Global { slug } => Self::Global(slug.clone()),
        }
    }
}

/// Per-field read rules, keyed by field name. Fields without an entry are
/// readable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPermissions(BTreeMap<String, FieldPermission>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPermission {
    #[serde(default = "readable")]
    pub read: bool,
    /// Rules for the children of a group or array field.
    #[serde(default, skip_serializing_if = "FieldPermissions::is_empty")]
    pub fields: FieldPermissions,
    /// Rules for the children of each block variant, keyed by slug.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub blocks: BTreeMap<String, FieldPermissions>,
}

fn readable() -> bool {
    true
}

impl Default for FieldPermission {
    fn default() -> Self {
        Self {
            read: true,
            fields: FieldPermissions::default(),
            blocks: BTreeMap::new(),
        }
    }
}

static NO_RULES: FieldPermissions = FieldPermissions(BTreeMap::new());

impl FieldPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide the field called `name`.
    pub fn deny(mut self, name: impl Into<String>) -> Self {
        self.0.insert(
            name.into(),
            FieldPermission {
                read: false,
                ..FieldPermission::default()
            },
        );
        self
    }

    /// Set the rules for the children of `name`.
    pub fn nested(mut self, name: impl Into<String>, fields: FieldPermissions) -> Self {
        self.0.entry(name.into()).or_default().fields = fields;
        self
    }

    /// Set the rules for the children of one block variant of `name`.
    pub fn block(
        mut self,
        name: impl Into<String>,
        slug: impl Into<String>,
        fields: FieldPermissions,
    ) -> Self {
        self.0
            .entry(name.into())
            .or_default()
            .blocks
            .insert(slug.into(), fields);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldPermission> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Drop the fields `permissions` hides, at any depth.
pub fn filter_fields(fields: &[Field], permissions: &FieldPermissions) -> Vec<Field> {
    fields
        .iter()
        .filter_map(|field| filter_field(field, permissions))
        .collect()
}

fn filter_field(field: &Field, permissions: &FieldPermissions) -> Option<Field> {
    let entry = field.name().and_then(|name| permissions.get(name));
    if entry.is_some_and(|p| !p.read) {
        return None;
    }
    let nested = entry.map_or(&NO_RULES, |p| &p.fields);

    let filtered = match field {
        Field::Group(group) => {
            let mut group = group.clone();
            group.fields = filter_fields(&group.fields, nested);
            Field::Group(group)
        }
        Field::Array(array) => {
            let mut array = array.clone();
            array.fields = filter_fields(&array.fields, nested);
            Field::Array(array)
        }
        Field::Blocks(blocks) => {
            let mut blocks = blocks.clone();
            for variant in &mut blocks.blocks {
                let rules = entry
                    .and_then(|p| p.blocks.get(&variant.slug))
                    .unwrap_or(&NO_RULES);
                variant.fields = filter_fields(&variant.fields, rules);
            }
            Field::Blocks(blocks)
        }
        // Layout children live at the same data level as the layout itself.
        Field::Layout(layout) => {
            let mut layout = layout.clone();
            layout.fields = filter_fields(&layout.fields, permissions);
            Field::Layout(layout)
        }
        other => other.clone(),
    };
    Some(filtered)
}

#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn can_read(&self, entity: &EntityRef) -> VersionResult<bool>;
    async fn can_update(&self, entity: &EntityRef) -> VersionResult<bool>;
    async fn field_permissions(&self, entity: &EntityRef) -> VersionResult<FieldPermissions>;
}

/// Grants everything.
pub struct AllowAll;

#[async_trait]
impl PermissionProvider for AllowAll {
    async fn can_read(&self, _entity: &EntityRef) -> VersionResult<bool> {
        Ok(true)
    }

    async fn can_update(&self, _entity: &EntityRef) -> VersionResult<bool> {
        Ok(true)
    }

    async fn field_permissions(&self, _entity: &EntityRef) -> VersionResult<FieldPermissions> {
        Ok(FieldPermissions::default())
    }
}

/// Fixed grants per collection or global. Denies anything not granted.
#[derive(Clone, Debug, Default)]
pub struct StaticPermissions {
    read: HashSet<Scope>,
    update: HashSet<Scope>,
    fields: HashMap<Scope, FieldPermissions>,
}

impl StaticPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_read(mut self, scope: Scope) -> Self {
        self.read.insert(scope);
        self
    }

    /// Grant read and update.
    pub fn allow_update(mut self, scope: Scope) -> Self {
        self.read.insert(scope.clone());
        self.update.insert(scope);
        self
    }

    pub fn with_fields(mut self, scope: Scope, fields: FieldPermissions) -> Self {
        self.fields.insert(scope, fields);
        self
    }
}

#[async_trait]
impl PermissionProvider for StaticPermissions {
    async fn can_read(&self, entity: &EntityRef) -> VersionResult<bool> {
        Ok(self.read.contains(&Scope::from(entity)))
    }

    async fn can_update(&self, entity: &EntityRef) -> VersionResult<bool> {
        Ok(self.update.contains(&Scope::from(entity)))
    }

    async fn field_permissions(&self, entity: &EntityRef) -> VersionResult<FieldPermissions> {
        Ok(self
            .fields
            .get(&Scope::from(entity))
            .cloned()
            .unwrap_or_default())
    }
}
