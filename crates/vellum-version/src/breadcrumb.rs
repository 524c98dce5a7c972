//! Navigation trail of a version page.
//!
//! The trail is a pure function of configuration and the fetched documents,
//! recomputed whenever any input changes.

use chrono::format::{Item, StrftimeItems};
use serde::Serialize;
use serde_json::Value;
use vellum_diff::Translator;
use vellum_schema::{find_field, CollectionConfig, EntityConfig};
use vellum_types::{DocumentData, EntityRef, LocaleCode, Timestamp};

/// One breadcrumb entry; the last one has no link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NavItem {
    fn link(label: impl Into<String>, url: String) -> Self {
        Self {
            label: label.into(),
            url: Some(url),
        }
    }

    fn text(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: None,
        }
    }
}

pub struct BreadcrumbInput<'a> {
    pub config: EntityConfig<'a>,
    pub entity: &'a EntityRef,
    /// Mount path of the admin UI, e.g. `/admin`.
    pub admin_route: &'a str,
    /// Current draft-inclusive document, used for the document label.
    pub most_recent: Option<&'a DocumentData>,
    pub created_at: Timestamp,
    pub locale: Option<&'a LocaleCode>,
    pub date_format: &'a str,
    pub translator: &'a dyn Translator,
}

pub fn derive_breadcrumb(input: &BreadcrumbInput<'_>) -> Vec<NavItem> {
    let admin = input.admin_route.trim_end_matches('/');
    let versions = input.translator.translate("version:versions", &[]);
    let date = NavItem::text(format_date(input.created_at, input.date_format));

    match (input.config, input.entity) {
        (EntityConfig::Collection(collection), EntityRef::Collection { slug, id }) => {
            let base = format!("{admin}/collections/{slug}");
            let label = input.most_recent.map_or_else(String::new, |doc| {
                document_label(collection, doc, input.locale, input.translator)
            });
            vec![
                NavItem::link(
                    input.translator.translate(&collection.labels().plural, &[]),
                    base.clone(),
                ),
                NavItem::link(label, format!("{base}/{id}")),
                NavItem::link(versions, format!("{base}/{id}/versions")),
                date,
            ]
        }
        (config, entity) => {
            let base = format!("{admin}/globals/{}", entity.slug());
            vec![
                NavItem::link(
                    input.translator.translate(&config.singular_label(), &[]),
                    base.clone(),
                ),
                NavItem::link(versions, format!("{base}/versions")),
                date,
            ]
        }
    }
}

/// Title of a collection document as shown in navigation.
///
/// Uses the `useAsTitle` field, reading the requested locale of localized
/// titles. `useAsTitle = "id"` shows the document id.
pub fn document_label(
    collection: &CollectionConfig,
    doc: &DocumentData,
    locale: Option<&LocaleCode>,
    translator: &dyn Translator,
) -> String {
    let title = collection.admin.use_as_title.as_str();
    if title == "id" {
        return doc.get("id").map(display_value).unwrap_or_default();
    }

    let field = find_field(&collection.fields, title);
    match (field, doc.get(title)) {
        (Some(field), Some(value)) if is_present(value) => {
            if field.localized() {
                locale
                    .and_then(|code| value.get(code.as_str()))
                    .map(display_value)
                    .unwrap_or_default()
            } else {
                display_value(value)
            }
        }
        _ => format!("[{}]", translator.translate("general:untitled", &[])),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Format a timestamp with a `strftime` pattern. Invalid patterns fall back
/// to RFC 3339.
pub fn format_date(at: Timestamp, pattern: &str) -> String {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return at.to_rfc3339();
    }
    at.format_with_items(items.iter()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use vellum_diff::DefaultTranslator;
    use vellum_schema::AppConfig;
    use vellum_types::DocumentId;

    const CONFIG: &str = r#"
[localization]
defaultLocale = "en"
locales = [{ code = "en", label = "English" }, { code = "de", label = "Deutsch" }]

[[collections]]
slug = "posts"
labels = { singular = "Post", plural = "Posts" }
admin = { useAsTitle = "title" }
fields = [{ type = "text", name = "title", localized = true }]

[[collections]]
slug = "orders"
fields = [{ type = "number", name = "total" }]

[[collections]]
slug = "pages"
admin = { useAsTitle = "name" }
fields = [{ type = "row", fields = [{ type = "text", name = "name" }] }]

[[globals]]
slug = "site-header"
fields = [{ type = "text", name = "tagline" }]
"#;

    fn config() -> AppConfig {
        AppConfig::from_toml_str(CONFIG).unwrap()
    }

    fn data(value: Value) -> DocumentData {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn created() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 0).unwrap()
    }

    fn crumbs(config: &AppConfig, entity: &EntityRef, doc: Option<&DocumentData>, locale: Option<&LocaleCode>) -> Vec<NavItem> {
        derive_breadcrumb(&BreadcrumbInput {
            config: config.entity(entity).unwrap(),
            entity,
            admin_route: "/admin",
            most_recent: doc,
            created_at: created(),
            locale,
            date_format: &config.admin.date_format,
            translator: &DefaultTranslator,
        })
    }

    #[test]
    fn collection_trail() {
        let config = config();
        let post = EntityRef::collection("posts", DocumentId::new("42").unwrap());
        let doc = data(json!({"id": "42", "title": {"en": "Hello", "de": "Hallo"}}));
        let en = LocaleCode::new("en").unwrap();

        let trail = crumbs(&config, &post, Some(&doc), Some(&en));
        assert_eq!(
            trail,
            vec![
                NavItem::link("Posts", "/admin/collections/posts".into()),
                NavItem::link("Hello", "/admin/collections/posts/42".into()),
                NavItem::link("Versions", "/admin/collections/posts/42/versions".into()),
                NavItem::text("March 1 2024, 2:05 PM"),
            ]
        );
    }

    #[test]
    fn localized_title_follows_locale() {
        let config = config();
        let post = EntityRef::collection("posts", DocumentId::new("42").unwrap());
        let doc = data(json!({"title": {"en": "Hello", "de": "Hallo"}}));
        let de = LocaleCode::new("de").unwrap();
        assert_eq!(crumbs(&config, &post, Some(&doc), Some(&de))[1].label, "Hallo");
    }

    #[test]
    fn missing_title_is_untitled() {
        let config = config();
        let post = EntityRef::collection("posts", DocumentId::new("42").unwrap());
        let doc = data(json!({"title": null}));
        assert_eq!(crumbs(&config, &post, Some(&doc), None)[1].label, "[Untitled]");
    }

    #[test]
    fn id_title_and_missing_document() {
        let config = config();
        let order = EntityRef::collection("orders", DocumentId::new("7").unwrap());
        let doc = data(json!({"id": 7, "total": 10}));
        let trail = crumbs(&config, &order, Some(&doc), None);
        assert_eq!(trail[0].label, "Orders");
        assert_eq!(trail[1].label, "7");
        assert_eq!(crumbs(&config, &order, None, None)[1].label, "");
    }

    #[test]
    fn title_field_inside_layout() {
        let config = config();
        let page = EntityRef::collection("pages", DocumentId::new("p").unwrap());
        let doc = data(json!({"name": "About"}));
        assert_eq!(crumbs(&config, &page, Some(&doc), None)[1].label, "About");
    }

    #[test]
    fn global_trail() {
        let config = config();
        let header = EntityRef::global("site-header");
        let trail = crumbs(&config, &header, None, None);
        assert_eq!(trail.len(), 3);
        assert_eq!(trail[0], NavItem::link("Site Header", "/admin/globals/site-header".into()));
        assert_eq!(trail[1].url.as_deref(), Some("/admin/globals/site-header/versions"));
        assert!(trail[2].url.is_none());
    }

    #[test]
    fn invalid_date_format_falls_back() {
        assert_eq!(format_date(created(), "%Y-%m-%d"), "2024-03-01");
        assert_eq!(format_date(created(), "%Q"), "2024-03-01T14:05:00+00:00");
    }
}
