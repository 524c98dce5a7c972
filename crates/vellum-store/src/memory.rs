use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use vellum_schema::{AppConfig, Field, RelationshipField};
use vellum_types::{DocumentData, DocumentId, EntityRef, LocaleCode, VersionId};

use crate::error::{StoreError, StoreResult};
use crate::request::{FetchParams, FetchRequest, LocaleParam, Resource};
use crate::snapshot::{VersionSnapshot, VersionStatus, VersionSummary, STATUS_KEY};
use crate::traits::DocumentSource;

/// In-memory document store for tests, local demos, and embedding.
///
/// Every entity owns an append-only stream of versions. The current document
/// is the newest version (drafts included) or the newest published one.
/// Reads are schema-aware: they flatten localized fields when a single
/// locale is requested and populate relationships when `depth >= 1`.
pub struct InMemoryDocumentStore {
    config: Arc<AppConfig>,
    inner: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    streams: HashMap<EntityRef, Vec<VersionSnapshot>>,
    version_index: HashMap<VersionId, (EntityRef, usize)>,
}

impl StoreState {
    fn current(&self, entity: &EntityRef, draft: bool) -> Option<&VersionSnapshot> {
        let stream = self.streams.get(entity)?;
        if draft {
            stream.last()
        } else {
            stream.iter().rev().find(|v| v.is_published())
        }
    }

    fn first(&self, entity: &EntityRef) -> Option<&VersionSnapshot> {
        self.streams.get(entity).and_then(|s| s.first())
    }

    fn version(&self, id: &VersionId) -> Option<(&EntityRef, &VersionSnapshot)> {
        let (entity, index) = self.version_index.get(id)?;
        let snapshot = self.streams.get(entity)?.get(*index)?;
        Some((entity, snapshot))
    }
}

impl InMemoryDocumentStore {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            inner: RwLock::new(StoreState::default()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Append a draft version.
    pub fn save_draft(
        &self,
        entity: &EntityRef,
        data: DocumentData,
    ) -> StoreResult<VersionSnapshot> {
        self.append(entity, data, VersionStatus::Draft, false)
    }

    /// Append a draft version flagged as an autosave.
    pub fn autosave(&self, entity: &EntityRef, data: DocumentData) -> StoreResult<VersionSnapshot> {
        self.append(entity, data, VersionStatus::Draft, true)
    }

    /// Append a published version.
    pub fn publish(&self, entity: &EntityRef, data: DocumentData) -> StoreResult<VersionSnapshot> {
        self.append(entity, data, VersionStatus::Published, false)
    }

    /// Append a prebuilt snapshot, keeping its id and timestamps.
    pub fn insert_version(
        &self,
        entity: &EntityRef,
        mut snapshot: VersionSnapshot,
    ) -> StoreResult<VersionSnapshot> {
        self.ensure_known(entity)?;
        let mut state = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        if state.version_index.contains_key(&snapshot.id) {
            return Err(StoreError::DuplicateVersion(snapshot.id.to_string()));
        }
        snapshot.parent = entity.document_id().cloned();
        snapshot
            .data
            .insert(STATUS_KEY.into(), Value::String(snapshot.status.as_str().into()));
        Ok(Self::push(&mut state, entity, snapshot))
    }

    /// Number of versions stored for an entity.
    pub fn version_count(&self, entity: &EntityRef) -> StoreResult<usize> {
        Ok(self.read()?.streams.get(entity).map_or(0, Vec::len))
    }

    fn append(
        &self,
        entity: &EntityRef,
        mut data: DocumentData,
        status: VersionStatus,
        autosave: bool,
    ) -> StoreResult<VersionSnapshot> {
        self.ensure_known(entity)?;
        let mut state = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;

        let last = state
            .streams
            .get(entity)
            .and_then(|s| s.last())
            .map(|v| v.created_at);
        let mut now = Utc::now();
        if let Some(last) = last {
            if now <= last {
                now = last + Duration::milliseconds(1);
            }
        }

        data.insert(STATUS_KEY.into(), Value::String(status.as_str().into()));
        let snapshot = VersionSnapshot {
            id: VersionId::generate(),
            parent: entity.document_id().cloned(),
            created_at: now,
            updated_at: now,
            autosave,
            status,
            data,
        };
        tracing::debug!(
            entity = %entity,
            version = %snapshot.id,
            status = status.as_str(),
            "appended version"
        );
        Ok(Self::push(&mut state, entity, snapshot))
    }

    fn push(
        state: &mut StoreState,
        entity: &EntityRef,
        snapshot: VersionSnapshot,
    ) -> VersionSnapshot {
        let stream = state.streams.entry(entity.clone()).or_default();
        stream.push(snapshot.clone());
        let index = stream.len() - 1;
        state
            .version_index
            .insert(snapshot.id.clone(), (entity.clone(), index));
        snapshot
    }

    fn ensure_known(&self, entity: &EntityRef) -> StoreResult<()> {
        self.config
            .entity(entity)
            .map(|_| ())
            .map_err(|_| StoreError::UnknownEntity(entity.to_string()))
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn fields_of(&self, entity: &EntityRef) -> &[Field] {
        self.config
            .entity(entity)
            .map(|e| e.fields())
            .unwrap_or(&[])
    }

    /// Apply the locale and depth parameters to stored field values.
    fn shape(
        &self,
        state: &StoreState,
        entity: &EntityRef,
        data: &DocumentData,
        params: &FetchParams,
        populate_relations: bool,
    ) -> DocumentData {
        let fields = self.fields_of(entity);
        let mut data = data.clone();
        let localized = self.config.localization.is_some();

        if let (LocaleParam::Code(code), true) = (&params.locale, localized) {
            localize(fields, &mut data, code);
        }
        if populate_relations && params.depth >= 1 {
            let locale_maps = localized && params.locale == LocaleParam::All;
            let mut resolve = |collection: &str, id: &Value| -> Option<Value> {
                let target = EntityRef::collection(collection, DocumentId::from_value(id)?);
                let current = state.current(&target, params.draft)?;
                Some(Value::Object(self.document(state, &target, current, params, false)))
            };
            populate(fields, &mut data, locale_maps, &mut resolve);
        }
        data
    }

    /// Current-document view of a version: shaped data plus metadata.
    fn document(
        &self,
        state: &StoreState,
        entity: &EntityRef,
        current: &VersionSnapshot,
        params: &FetchParams,
        populate_relations: bool,
    ) -> DocumentData {
        let mut data = self.shape(state, entity, &current.data, params, populate_relations);
        if let Some(id) = entity.document_id() {
            data.insert("id".into(), Value::String(id.to_string()));
        }
        let created_at = state.first(entity).map_or(current.created_at, |v| v.created_at);
        data.insert("createdAt".into(), Value::String(created_at.to_rfc3339()));
        data.insert("updatedAt".into(), Value::String(current.updated_at.to_rfc3339()));
        data
    }
}

#[async_trait]
impl DocumentSource for InMemoryDocumentStore {
    async fn fetch_document(&self, request: &FetchRequest) -> StoreResult<Option<DocumentData>> {
        let Resource::Document(entity) = &request.resource else {
            return Err(StoreError::WrongResource {
                expected: "document",
                url: request.url.clone(),
            });
        };
        let state = self.read()?;
        let document = state
            .current(entity, request.params.draft)
            .map(|current| self.document(&state, entity, current, &request.params, true));
        tracing::debug!(
            url = %request.url,
            draft = request.params.draft,
            found = document.is_some(),
            "fetch document"
        );
        Ok(document)
    }

    async fn fetch_version(&self, request: &FetchRequest) -> StoreResult<Option<VersionSnapshot>> {
        let Resource::Version { entity, version } = &request.resource else {
            return Err(StoreError::WrongResource {
                expected: "version",
                url: request.url.clone(),
            });
        };
        let state = self.read()?;
        let Some((owner, snapshot)) = state.version(version) else {
            tracing::debug!(url = %request.url, "version not found");
            return Ok(None);
        };
        if owner != entity {
            tracing::debug!(
                url = %request.url,
                owner = %owner,
                "version belongs to another entity"
            );
            return Ok(None);
        }
        let mut snapshot = snapshot.clone();
        snapshot.data = self.shape(&state, entity, &snapshot.data, &request.params, true);
        Ok(Some(snapshot))
    }

    async fn list_versions(
        &self,
        entity: &EntityRef,
        limit: usize,
    ) -> StoreResult<Vec<VersionSummary>> {
        let state = self.read()?;
        Ok(state
            .streams
            .get(entity)
            .map(|stream| {
                stream
                    .iter()
                    .rev()
                    .take(limit)
                    .map(VersionSnapshot::summary)
                    .collect()
            })
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Schema-aware value shaping
// ---------------------------------------------------------------------------

/// Call `f` with the child schema and object of every row under a container.
fn for_each_row(field: &Field, value: &mut Value, f: &mut dyn FnMut(&[Field], &mut DocumentData)) {
    match (field, value) {
        (Field::Group(group), Value::Object(map)) => f(&group.fields, map),
        (Field::Array(array), Value::Array(rows)) => {
            for row in rows {
                if let Value::Object(map) = row {
                    f(&array.fields, map);
                }
            }
        }
        (Field::Blocks(blocks), Value::Array(rows)) => {
            for row in rows {
                let Some(variant) = blocks.variant_for(row) else {
                    continue;
                };
                if let Value::Object(map) = row {
                    f(&variant.fields, map);
                }
            }
        }
        _ => {}
    }
}

/// Replace every `{ locale: value }` map of a localized field by one locale's value.
fn localize(fields: &[Field], data: &mut DocumentData, code: &LocaleCode) {
    for field in fields {
        if let Field::Layout(layout) = field {
            localize(&layout.fields, data, code);
            continue;
        }
        let Some(value) = field.name().and_then(|name| data.get_mut(name)) else {
            continue;
        };
        if field.localized() {
            *value = value.get(code.as_str()).cloned().unwrap_or(Value::Null);
        }
        for_each_row(field, value, &mut |fields, row| localize(fields, row, code));
    }
}

type Resolve<'a> = dyn FnMut(&str, &Value) -> Option<Value> + 'a;

fn populate(
    fields: &[Field],
    data: &mut DocumentData,
    locale_maps: bool,
    resolve: &mut Resolve<'_>,
) {
    for field in fields {
        if let Field::Layout(layout) = field {
            populate(&layout.fields, data, locale_maps, resolve);
            continue;
        }
        let Some(value) = field.name().and_then(|name| data.get_mut(name)) else {
            continue;
        };
        if locale_maps && field.localized() {
            if let Value::Object(per_locale) = value {
                for localized in per_locale.values_mut() {
                    populate_value(field, localized, locale_maps, resolve);
                }
                continue;
            }
        }
        populate_value(field, value, locale_maps, resolve);
    }
}

fn populate_value(field: &Field, value: &mut Value, locale_maps: bool, resolve: &mut Resolve<'_>) {
    if let Field::Relationship(relationship) = field {
        match value {
            Value::Array(items) if relationship.has_many => {
                for item in items {
                    populate_reference(relationship, item, resolve);
                }
            }
            value => populate_reference(relationship, value, resolve),
        }
        return;
    }
    for_each_row(field, value, &mut |fields, row| populate(fields, row, locale_maps, resolve));
}

fn populate_reference(
    relationship: &RelationshipField,
    value: &mut Value,
    resolve: &mut Resolve<'_>,
) {
    if relationship.relation_to.is_polymorphic() {
        let Value::Object(pair) = value else {
            return;
        };
        let relation_to = pair.get("relationTo").and_then(Value::as_str).map(str::to_string);
        let Some(collection) = relation_to else {
            return;
        };
        if let Some(inner) = pair.get_mut("value") {
            if let Some(document) = resolve(&collection, inner) {
                *inner = document;
            }
        }
    } else if let Some(collection) = relationship.relation_to.collections().first() {
        if let Some(document) = resolve(collection, value) {
            *value = document;
        }
    }
}
