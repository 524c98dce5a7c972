//! Version comparison for Vellum.
//!
//! Given an entity, the version being inspected and a compare target, this
//! crate checks permissions, fetches the snapshots involved, diffs them and
//! assembles everything a version page shows.
//!
//! # Key Types
//!
//! - [`VersionResolver`] -- Concurrent, permission-checked snapshot fetching
//! - [`PermissionProvider`] -- Read/update capability and field visibility
//! - [`VersionService`] -- Resolve, filter, diff and render in one call
//! - [`VersionViewModel`] -- Heading, breadcrumb, compare options and diff rows
//! - [`CompareSession`] -- Current selection; discards stale results

pub mod breadcrumb;
pub mod config;
pub mod error;
pub mod permission;
pub mod resolver;
pub mod service;
pub mod session;
pub mod view;

pub use breadcrumb::{derive_breadcrumb, document_label, format_date, BreadcrumbInput, NavItem};
pub use config::ResolverConfig;
pub use error::{VersionError, VersionResult};
pub use permission::{
    filter_fields, Action, AllowAll, FieldPermission, FieldPermissions, PermissionProvider,
    Scope, StaticPermissions,
};
pub use resolver::{ResolvedVersions, VersionResolver};
pub use service::{CompareRequest, VersionService};
pub use session::{CompareSession, SelectionKey};
pub use view::{
    build_view, CompareOption, ComparisonState, PageMeta, RestoreAction, ViewInput,
    VersionViewModel,
};
