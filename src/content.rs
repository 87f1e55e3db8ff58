//! Parser-facing data records: site, page, section, locale.
//!
//! These are the structured values the external content parser produces from
//! markdown/YAML sources. They deserialize with per-field defaults so a
//! partially-specified site still loads. Section bodies stay raw
//! [`Value`]s — the runtime hands them to components untouched and does not
//! validate their shape.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::SiteError;

/// Route of the special page whose sections fill every page's header area.
pub const HEADER_ROUTE: &str = "_header";
/// Route of the special page whose sections fill every page's footer area.
pub const FOOTER_ROUTE: &str = "_footer";
/// Route of the special page whose sections fill the left area.
pub const LEFT_ROUTE: &str = "_left";
/// Route of the special page whose sections fill the right area.
pub const RIGHT_ROUTE: &str = "_right";

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Locale
// ---------------------------------------------------------------------------

/// One entry in the site's locale list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Locale {
    /// Language code, e.g. "en" or "pt-BR".
    pub code: String,
    /// Human-readable label, e.g. "English".
    #[serde(default)]
    pub label: String,
    /// Whether this is the site's default locale.
    #[serde(default)]
    pub default: bool,
}

impl Locale {
    /// Create a locale with the given code and label.
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            default: false,
        }
    }

    /// Mark this locale as the site default (builder).
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

// ---------------------------------------------------------------------------
// SectionData
// ---------------------------------------------------------------------------

/// One content section as produced by the parser.
///
/// A section becomes exactly one [`Block`](crate::block::node::Block);
/// `subsections` become its child blocks, recursively.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionData {
    /// Component type name, e.g. "Hero". Empty resolves to the fallback.
    #[serde(default, rename = "type")]
    pub type_name: String,
    /// Theme name applied to this section.
    #[serde(default)]
    pub theme: String,
    /// Author frontmatter. Reserved keys are stripped at block construction.
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Pre-parsed structured body. Passed through unvalidated.
    #[serde(default)]
    pub content: Value,
    /// Nested sections, one child block each.
    #[serde(default)]
    pub subsections: Vec<SectionData>,
}

impl SectionData {
    /// Create a section of the given component type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            theme: String::new(),
            params: Map::new(),
            content: Value::Null,
            subsections: Vec::new(),
        }
    }

    /// Set the theme name (builder).
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Add one frontmatter param (builder).
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the structured content body (builder).
    pub fn with_content(mut self, content: impl Into<Value>) -> Self {
        self.content = content.into();
        self
    }

    /// Append a nested subsection (builder).
    pub fn with_subsection(mut self, subsection: SectionData) -> Self {
        self.subsections.push(subsection);
        self
    }
}

// ---------------------------------------------------------------------------
// PageData
// ---------------------------------------------------------------------------

/// One page record: route, metadata, body sections, area opt-ins.
///
/// `header`/`footer` default to opted-in; the areas still only materialize
/// when the site defines the corresponding special page. `left`/`right` are
/// opt-in per page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageData {
    /// URL path, e.g. "/about". The four reserved `_`-routes mark special
    /// pages (see [`HEADER_ROUTE`] and friends).
    pub route: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Body sections, in authored order.
    #[serde(default)]
    pub sections: Vec<SectionData>,
    #[serde(default = "default_true")]
    pub header: bool,
    #[serde(default = "default_true")]
    pub footer: bool,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
}

impl PageData {
    /// Create a page record for the given route.
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            title: String::new(),
            description: String::new(),
            sections: Vec::new(),
            header: true,
            footer: true,
            left: false,
            right: false,
        }
    }

    /// Set the page title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Append a body section (builder).
    pub fn with_section(mut self, section: SectionData) -> Self {
        self.sections.push(section);
        self
    }

    /// Set header opt-in (builder).
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Set footer opt-in (builder).
    pub fn with_footer(mut self, footer: bool) -> Self {
        self.footer = footer;
        self
    }

    /// Whether this record is one of the four reserved special pages.
    pub fn is_special(&self) -> bool {
        matches!(
            self.route.as_str(),
            HEADER_ROUTE | FOOTER_ROUTE | LEFT_ROUTE | RIGHT_ROUTE
        )
    }
}

// ---------------------------------------------------------------------------
// SiteData
// ---------------------------------------------------------------------------

/// The full site-data record handed to [`Website::new`](crate::website::Website::new).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteData {
    #[serde(default)]
    pub pages: Vec<PageData>,
    #[serde(default)]
    pub locales: Vec<Locale>,
    /// Global configuration object. Opaque to the runtime.
    #[serde(default)]
    pub config: Value,
    /// Global theme object. Opaque to the runtime.
    #[serde(default)]
    pub theme: Value,
}

impl SiteData {
    /// Create empty site data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize site data from a raw parsed value.
    pub fn from_value(value: Value) -> Result<Self, SiteError> {
        serde_json::from_value(value).map_err(SiteError::from)
    }

    /// Append a page record (builder).
    pub fn with_page(mut self, page: PageData) -> Self {
        self.pages.push(page);
        self
    }

    /// Append a locale (builder).
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locales.push(locale);
        self
    }
}
