use serde_json::{Map, Value};

/// The field values of one document snapshot, keyed by top-level field name.
///
/// Values are shaped by the collection schema. Localized fields fetched with
/// `locale = '*'` hold an object keyed by locale code.
pub type DocumentData = Map<String, Value>;
