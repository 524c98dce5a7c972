//! Diff engine for Vellum.
//!
//! Compares two snapshots of the same document field by field, guided by the
//! collection schema, and flattens the result into labelled rows for display.
//!
//! # Key Types
//!
//! - [`LocaleSet`] / [`LocalePair`] -- Per-locale fan-out of localized values
//! - [`DiffNode`] / [`DiffTree`] / [`ChangeKind`] -- Structured field-level diff
//! - [`RenderNode`] -- Flattened, labelled diff row
//! - [`Translator`] -- Label lookup collaborator
//! - [`WordDiff`] -- Word-level diff of modified text values

pub mod dispatch;
pub mod error;
pub mod locale;
pub mod node;
pub mod render;
pub mod text_diff;

pub use dispatch::{diff, diff_document, diff_field};
pub use error::{DiffError, DiffResult};
pub use locale::{expand, LocalePair, LocaleSet};
pub use node::{ChangeCounts, ChangeKind, DiffNode, DiffTree, NodeKind};
pub use render::{
    render, DefaultTranslator, LocaleLabels, RenderNode, RenderOptions, Translator,
};
pub use text_diff::{diff_words, TextSegment, WordDiff};
