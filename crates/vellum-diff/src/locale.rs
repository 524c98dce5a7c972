//! Locale fan-out: split localized values into one comparison per locale.

use serde_json::Value;
use vellum_schema::{AppConfig, Field};
use vellum_types::LocaleCode;

/// Ordered locales a comparison covers.
///
/// Whether localization is enabled is tracked apart from the codes: a
/// selection that keeps no configured locale is still localized and fans
/// every localized field out to zero locales.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocaleSet {
    enabled: bool,
    codes: Vec<LocaleCode>,
}

impl LocaleSet {
    pub fn new(codes: Vec<LocaleCode>) -> Self {
        Self {
            enabled: true,
            codes,
        }
    }

    /// Localization disabled.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Every configured locale in declaration order, or disabled when the
    /// configuration has no localization section.
    pub fn from_config(config: &AppConfig) -> Self {
        match &config.localization {
            Some(localization) => Self::new(localization.codes()),
            None => Self::disabled(),
        }
    }

    /// Keep the requested locales that are configured, in requested order.
    /// An empty request keeps everything. A disabled set stays disabled.
    pub fn select(&self, requested: &[LocaleCode]) -> Self {
        if requested.is_empty() || !self.enabled {
            return self.clone();
        }
        let mut codes: Vec<LocaleCode> = Vec::new();
        for code in requested {
            if self.codes.contains(code) && !codes.contains(code) {
                codes.push(code.clone());
            }
        }
        Self::new(codes)
    }

    /// Returns `true` if `requested` names locales but none of them survive
    /// [`select`](Self::select).
    pub fn matches_none(&self, requested: &[LocaleCode]) -> bool {
        self.enabled && !requested.is_empty() && !requested.iter().any(|c| self.codes.contains(c))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn codes(&self) -> &[LocaleCode] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// The two values of one field for one locale (or for no locale).
#[derive(Clone, Debug, PartialEq)]
pub struct LocalePair<'v> {
    pub locale: Option<LocaleCode>,
    pub base: Option<&'v Value>,
    pub comparison: Option<&'v Value>,
}

/// Split a field's values into per-locale pairs.
///
/// Non-localized fields, or any field while localization is disabled, yield
/// a single pair without a locale. Localized fields yield one pair per
/// locale in `locales` order, and none for an enabled set with no codes; a
/// missing locale key is `None`.
pub fn expand<'v>(
    field: &Field,
    base: Option<&'v Value>,
    comparison: Option<&'v Value>,
    locales: &LocaleSet,
) -> Vec<LocalePair<'v>> {
    if !field.localized() || !locales.is_enabled() {
        return vec![LocalePair {
            locale: None,
            base,
            comparison,
        }];
    }
    locales
        .codes()
        .iter()
        .map(|code| LocalePair {
            locale: Some(code.clone()),
            base: base.and_then(|v| v.get(code.as_str())),
            comparison: comparison.and_then(|v| v.get(code.as_str())),
        })
        .collect()
}
