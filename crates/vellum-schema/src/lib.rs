//! Field schema model for Vellum.
//!
//! Collections and globals are declared as ordered lists of [`Field`]s. This
//! crate parses those declarations from configuration, validates them, and
//! walks them leaf by leaf.
//!
//! # Key Types
//!
//! - [`Field`] -- Closed set of field kinds (scalar, group, array, blocks, relationship, ...)
//! - [`FieldPath`] / [`PathSegment`] -- Location of a field or value inside a document
//! - [`SchemaWalk`] -- Lazy, restartable traversal of the leaves of a schema
//! - [`AppConfig`] -- Collections, globals, localization and routes

pub mod config;
pub mod error;
pub mod field;
pub mod path;
pub mod walker;

pub use config::{
    AdminConfig, AppConfig, CollectionAdmin, CollectionConfig, EntityConfig, GlobalConfig,
    Labels, LocaleOption, LocalizationConfig, Routes, VersionsConfig,
};
pub use error::{SchemaError, SchemaResult};
pub use field::{
    find_field, ArrayField, BlockVariant, BlocksField, Field, GroupField, LayoutField,
    LayoutKind, RelationTo, RelationshipField, ScalarField, ScalarKind, UiField, UnknownField,
    BLOCK_TYPE_KEY,
};
pub use path::{FieldPath, PathSegment};
pub use walker::{validate, walk, SchemaWalk, WalkedField};
