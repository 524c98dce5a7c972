//! Foundation types for Vellum.
//!
//! This crate provides the identity and addressing types shared by every
//! other Vellum crate: which document is being looked at, which version of
//! it, which locales are active and what it is being compared against.
//!
//! # Key Types
//!
//! - [`DocumentId`] / [`VersionId`] -- Opaque identifiers assigned by the store
//! - [`EntityRef`] -- A collection document or a global
//! - [`LocaleCode`] -- A configured locale code (`en`, `ar`, ...)
//! - [`CompareSelection`] -- Most recent draft, published, or a specific version
//! - [`DocumentData`] -- Top-level field map of a document snapshot

pub mod document;
pub mod entity;
pub mod error;
pub mod ids;
pub mod selection;
pub mod temporal;

pub use document::DocumentData;
pub use entity::EntityRef;
pub use error::TypeError;
pub use ids::{DocumentId, LocaleCode, VersionId};
pub use selection::CompareSelection;
pub use temporal::{instant_from_value, parse_instant, Timestamp};
