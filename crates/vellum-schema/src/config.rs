//! Application configuration: collections, globals, localization and routes.
//!
//! Configuration is read from TOML or JSON. Keys use camelCase in both
//! formats so the same document can be converted between them.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vellum_types::{EntityRef, LocaleCode};

use crate::error::{SchemaError, SchemaResult};
use crate::field::Field;
use crate::walker::validate;

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Origin the API is served from, e.g. `https://cms.example.com`.
    /// Empty means same-origin.
    #[serde(default)]
    pub server_url: String,
    #[serde(default)]
    pub routes: Routes,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub localization: Option<LocalizationConfig>,
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
    #[serde(default)]
    pub globals: Vec<GlobalConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub admin: String,
    pub api: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            admin: "/admin".into(),
            api: "/api".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminConfig {
    /// `strftime`-style pattern used for version timestamps.
    pub date_format: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            date_format: "%B %-d %Y, %-I:%M %p".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizationConfig {
    pub locales: Vec<LocaleOption>,
    pub default_locale: LocaleCode,
    #[serde(default)]
    pub fallback: bool,
}

impl LocalizationConfig {
    /// Locale codes in declaration order.
    pub fn codes(&self) -> Vec<LocaleCode> {
        self.locales.iter().map(|l| l.code.clone()).collect()
    }

    pub fn option(&self, code: &LocaleCode) -> Option<&LocaleOption> {
        self.locales.iter().find(|l| &l.code == code)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleOption {
    pub code: LocaleCode,
    pub label: String,
    #[serde(default)]
    pub rtl: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub singular: String,
    pub plural: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionAdmin {
    /// Field whose value titles a document; `id` uses the document id.
    pub use_as_title: String,
}

impl Default for CollectionAdmin {
    fn default() -> Self {
        Self {
            use_as_title: "id".into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VersionsConfig {
    /// Whether unpublished drafts are kept alongside published versions.
    pub drafts: bool,
    /// Versions kept per document; `0` keeps all.
    pub max_per_doc: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfig {
    pub slug: String,
    #[serde(default)]
    pub labels: Option<Labels>,
    #[serde(default)]
    pub admin: CollectionAdmin,
    #[serde(default)]
    pub versions: VersionsConfig,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl CollectionConfig {
    /// Labels, derived from the slug when not configured.
    pub fn labels(&self) -> Labels {
        self.labels.clone().unwrap_or_else(|| Labels {
            singular: title_case(&self.slug),
            plural: title_case(&self.slug),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    pub slug: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub versions: VersionsConfig,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl GlobalConfig {
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| title_case(&self.slug))
    }
}

/// Borrowed view of either a collection or a global configuration.
#[derive(Clone, Copy, Debug)]
pub enum EntityConfig<'a> {
    Collection(&'a CollectionConfig),
    Global(&'a GlobalConfig),
}

impl<'a> EntityConfig<'a> {
    pub fn slug(&self) -> &'a str {
        match self {
            Self::Collection(c) => &c.slug,
            Self::Global(g) => &g.slug,
        }
    }

    pub fn fields(&self) -> &'a [Field] {
        match self {
            Self::Collection(c) => &c.fields,
            Self::Global(g) => &g.fields,
        }
    }

    pub fn versions(&self) -> &'a VersionsConfig {
        match self {
            Self::Collection(c) => &c.versions,
            Self::Global(g) => &g.versions,
        }
    }

    /// Singular label of a collection, label of a global.
    pub fn singular_label(&self) -> String {
        match self {
            Self::Collection(c) => c.labels().singular,
            Self::Global(g) => g.label(),
        }
    }
}

impl AppConfig {
    /// Load from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> SchemaResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Io(format!("{}: {e}", path.display())))?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&raw)?,
            _ => Self::from_toml_str(&raw)?,
        };
        tracing::debug!(
            path = %path.display(),
            collections = config.collections.len(),
            globals = config.globals.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> SchemaResult<Self> {
        toml::from_str(raw).map_err(|e| SchemaError::Config(e.to_string()))
    }

    pub fn from_json_str(raw: &str) -> SchemaResult<Self> {
        serde_json::from_str(raw).map_err(|e| SchemaError::Config(e.to_string()))
    }

    pub fn collection(&self, slug: &str) -> Option<&CollectionConfig> {
        self.collections.iter().find(|c| c.slug == slug)
    }

    pub fn global(&self, slug: &str) -> Option<&GlobalConfig> {
        self.globals.iter().find(|g| g.slug == slug)
    }

    /// Resolve the configuration for an entity reference.
    pub fn entity(&self, entity: &EntityRef) -> SchemaResult<EntityConfig<'_>> {
        let found = match entity {
            EntityRef::Collection { slug, .. } => {
                self.collection(slug).map(EntityConfig::Collection)
            }
            EntityRef::Global { slug } => self.global(slug).map(EntityConfig::Global),
        };
        found.ok_or_else(|| SchemaError::UnknownEntity {
            slug: entity.slug().to_string(),
        })
    }

    /// Configured locale codes, empty when localization is disabled.
    pub fn locale_codes(&self) -> Vec<LocaleCode> {
        self.localization
            .as_ref()
            .map(LocalizationConfig::codes)
            .unwrap_or_default()
    }

    /// Validate every schema plus the cross-entity invariants.
    pub fn validate(&self) -> SchemaResult<()> {
        let mut slugs = HashSet::new();
        for collection in &self.collections {
            if !slugs.insert(collection.slug.as_str()) {
                return Err(SchemaError::Config(format!(
                    "collection slug {:?} is declared twice",
                    collection.slug
                )));
            }
            validate(&collection.fields)?;
        }
        let mut global_slugs = HashSet::new();
        for global in &self.globals {
            if !global_slugs.insert(global.slug.as_str()) {
                return Err(SchemaError::Config(format!(
                    "global slug {:?} is declared twice",
                    global.slug
                )));
            }
            validate(&global.fields)?;
        }
        if let Some(localization) = &self.localization {
            if localization.locales.is_empty() {
                return Err(SchemaError::Config("localization declares no locales".into()));
            }
            if localization.option(&localization.default_locale).is_none() {
                return Err(SchemaError::Config(format!(
                    "default locale {:?} is not among the configured locales",
                    localization.default_locale.as_str()
                )));
            }
        }
        Ok(())
    }
}

fn title_case(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use vellum_types::DocumentId;

    const SAMPLE: &str = r#"
serverUrl = "http://localhost:3000"

[localization]
defaultLocale = "en"
locales = [
  { code = "en", label = "English" },
  { code = "ar", label = "Arabic", rtl = true },
]

[[collections]]
slug = "posts"
labels = { singular = "Post", plural = "Posts" }
admin = { useAsTitle = "title" }
versions = { drafts = true }

[[collections.fields]]
type = "text"
name = "title"
localized = true

[[collections.fields]]
type = "relationship"
name = "author"
relationTo = "users"

[[globals]]
slug = "site-header"

[[globals.fields]]
type = "text"
name = "tagline"
"#;

    #[test]
    fn parses_toml() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.server_url, "http://localhost:3000");
        assert_eq!(config.routes, Routes::default());
        assert_eq!(config.collections[0].fields.len(), 2);
        assert_eq!(config.collections[0].admin.use_as_title, "title");
        assert!(config.collections[0].versions.drafts);
        assert_eq!(config.locale_codes().len(), 2);
        config.validate().unwrap();
    }

    #[test]
    fn labels_default_from_slug() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.globals[0].label(), "Site Header");
        assert_eq!(config.collections[0].labels().plural, "Posts");
    }

    #[test]
    fn entity_lookup() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        let post = EntityRef::collection("posts", DocumentId::new("1").unwrap());
        assert_eq!(config.entity(&post).unwrap().slug(), "posts");
        assert_eq!(
            config.entity(&EntityRef::global("site-header")).unwrap().singular_label(),
            "Site Header"
        );
        assert_eq!(
            config.entity(&EntityRef::global("footer")).err(),
            Some(SchemaError::UnknownEntity {
                slug: "footer".into()
            })
        );
    }

    #[test]
    fn default_locale_must_be_declared() {
        let mut config = AppConfig::from_toml_str(SAMPLE).unwrap();
        if let Some(localization) = config.localization.as_mut() {
            localization.default_locale = LocaleCode::new("fr").unwrap();
        }
        assert!(matches!(config.validate(), Err(SchemaError::Config(_))));
    }

    #[test]
    fn duplicate_collection_slug_rejected() {
        let mut config = AppConfig::from_toml_str(SAMPLE).unwrap();
        let copy = config.collections[0].clone();
        config.collections.push(copy);
        assert!(matches!(config.validate(), Err(SchemaError::Config(_))));
    }

    #[test]
    fn load_from_json_file() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        let json = serde_json::to_string(&config).unwrap();

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = AppConfig::load(file.path()).unwrap();
        assert_eq!(loaded.collections[0].fields, config.collections[0].fields);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = AppConfig::load(Path::new("/nonexistent/vellum.toml")).unwrap_err();
        assert!(matches!(err, SchemaError::Io(_)));
    }
}
