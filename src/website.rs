//! Website: page set, active page, locales, render driver.
//!
//! [`Website`] is the single entry point for one loaded site. It is built
//! once per site-data load and replaced wholesale when a different site
//! loads; page navigation inside one site only moves the active-page
//! pointer and resets block state, it never rebuilds the graph. All
//! construction is synchronous — content fetching and parsing happen before
//! `Website::new` is called.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::block::BlockId;
use crate::content::{
    Locale, PageData, SiteData, FOOTER_ROUTE, HEADER_ROUTE, LEFT_ROUTE, RIGHT_ROUTE,
};
use crate::error::SiteError;
use crate::page::{Page, SpecialSections};
use crate::registry::{ChildRenderFn, ComponentRegistry, RenderPayload};

/// Top-level runtime container for one loaded site.
pub struct Website {
    pages: Vec<Page>,
    active: usize,
    locales: Vec<Locale>,
    config: Value,
    theme: Value,
    registry: Rc<dyn ComponentRegistry>,
}

impl Website {
    /// Build the full page set from site data.
    ///
    /// Pages build in input order and are numbered from zero; special pages
    /// (`_header`, `_footer`, `_left`, `_right`) are pulled out first and
    /// instantiated into the matching area of every opted-in page. Every
    /// block is wired and its component resolved before this returns. The
    /// first routable page starts active.
    ///
    /// Fails with [`SiteError::NoPages`] when no routable page remains and
    /// with [`SiteError::DuplicateRoute`] when two pages share a route.
    pub fn new(data: SiteData, registry: Rc<dyn ComponentRegistry>) -> Result<Self, SiteError> {
        let mut specials = SpecialSections::default();
        let mut routable: Vec<&PageData> = Vec::new();
        for page in &data.pages {
            match page.route.as_str() {
                HEADER_ROUTE => specials.header = Some(page.sections.clone()),
                FOOTER_ROUTE => specials.footer = Some(page.sections.clone()),
                LEFT_ROUTE => specials.left = Some(page.sections.clone()),
                RIGHT_ROUTE => specials.right = Some(page.sections.clone()),
                _ => routable.push(page),
            }
        }
        if routable.is_empty() {
            return Err(SiteError::NoPages);
        }

        let mut seen = HashSet::new();
        for page in &routable {
            if !seen.insert(page.route.as_str()) {
                return Err(SiteError::DuplicateRoute(page.route.clone()));
            }
        }

        let mut pages: Vec<Page> = routable
            .iter()
            .enumerate()
            .map(|(no, page)| Page::build(page, no, &specials))
            .collect();
        for page in &mut pages {
            page.init_components(registry.as_ref());
        }

        let locales = normalize_locales(data.locales);
        log::debug!(
            "website: built {} pages, {} locales",
            pages.len(),
            locales.len()
        );

        Ok(Self {
            pages,
            active: 0,
            locales,
            config: data.config,
            theme: data.theme,
            registry,
        })
    }

    /// Deserialize raw parsed site data, then build.
    pub fn from_value(
        value: Value,
        registry: Rc<dyn ComponentRegistry>,
    ) -> Result<Self, SiteError> {
        Self::new(SiteData::from_value(value)?, registry)
    }

    /// Make the page with the given route active.
    ///
    /// Does not touch block state; see [`navigate`](Self::navigate) for the
    /// route-change path. [`SiteError::PageNotFound`] when no page matches —
    /// the caller owns the 404 policy.
    pub fn set_active_page(&mut self, route: &str) -> Result<(), SiteError> {
        let index = self
            .pages
            .iter()
            .position(|page| page.route() == route)
            .ok_or_else(|| SiteError::PageNotFound(route.to_owned()))?;
        self.active = index;
        Ok(())
    }

    /// Route-change entry point: activate the page, then reset its blocks.
    ///
    /// Re-entering a route reuses the same page and block instances; only
    /// their state snaps back to the start state, so bridge connections
    /// survive navigation.
    pub fn navigate(&mut self, route: &str) -> Result<(), SiteError> {
        self.set_active_page(route)?;
        if let Some(page) = self.pages.get_mut(self.active) {
            page.init_state();
        }
        Ok(())
    }

    /// The currently active page.
    pub fn active_page(&self) -> &Page {
        &self.pages[self.active]
    }

    /// Mutable access to the active page.
    pub fn active_page_mut(&mut self) -> &mut Page {
        &mut self.pages[self.active]
    }

    /// All routable pages, in input order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Look up a page by route.
    pub fn page(&self, route: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.route() == route)
    }

    /// The site's locale list. Never empty.
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    /// The default-flagged locale, or the first one.
    pub fn active_locale(&self) -> &Locale {
        self.locales
            .iter()
            .find(|locale| locale.default)
            .unwrap_or(&self.locales[0])
    }

    /// Global configuration object.
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Global theme object.
    pub fn theme(&self) -> &Value {
        &self.theme
    }

    /// The component-resolution boundary this site renders through.
    pub fn registry(&self) -> &dyn ComponentRegistry {
        self.registry.as_ref()
    }

    /// The externally-registered child-block render delegate, if any.
    ///
    /// Parent-type components fetch this to render a chosen subset of their
    /// child blocks; the engine itself holds no rendering logic.
    pub fn child_block_renderer(&self) -> Option<ChildRenderFn> {
        self.registry.child_renderer()
    }

    /// Render one block of a page through the registry.
    ///
    /// Unresolved component types render through the fallback spec. `None`
    /// only for an unknown block id.
    pub fn render_block(&self, page: &Page, id: BlockId) -> Option<String> {
        let block = page.tree().get(id)?;
        let spec = self
            .registry
            .resolve(block.type_name())
            .unwrap_or_else(|| self.registry.fallback());
        let payload = RenderPayload {
            content: block.content(),
            params: block.params(),
            block,
            page,
            website: self,
        };
        Some(spec.render(&payload))
    }

    /// Render a page's flattened block sequence, one line per block.
    ///
    /// A single unknown or incompletely-specified block degrades to its
    /// fallback output; it never prevents the siblings from rendering.
    pub fn render_page(&self, route: &str) -> Result<String, SiteError> {
        let page = self
            .page(route)
            .ok_or_else(|| SiteError::PageNotFound(route.to_owned()))?;
        let rendered: Vec<String> = page
            .page_blocks()
            .into_iter()
            .filter_map(|id| self.render_block(page, id))
            .collect();
        Ok(rendered.join("\n"))
    }
}

impl fmt::Debug for Website {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Website")
            .field("pages", &self.pages.len())
            .field("active", &self.active)
            .field("locales", &self.locales.len())
            .finish()
    }
}

/// An empty locale list normalizes to a single default English entry; the
/// locale list is non-empty by invariant.
fn normalize_locales(locales: Vec<Locale>) -> Vec<Locale> {
    if locales.is_empty() {
        vec![Locale::new("en", "English").as_default()]
    } else {
        locales
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::content::SectionData;
    use crate::registry::{ComponentSpec, Registry};

    use super::*;

    fn demo_registry() -> Rc<Registry> {
        Rc::new(
            Registry::new()
                .with_component(
                    "Hero",
                    ComponentSpec::new(|payload| {
                        format!("<section>{}</section>", payload.block.theme())
                    })
                    .with_context(json!({"allowTranslucentTop": true})),
                )
                .with_component(
                    "NavBar",
                    ComponentSpec::new(|_| "<nav></nav>".to_owned()),
                ),
        )
    }

    fn demo_site() -> SiteData {
        SiteData::new()
            .with_page(
                PageData::new("/")
                    .with_title("Home")
                    .with_section(SectionData::new("NavBar"))
                    .with_section(SectionData::new("Hero").with_theme("dark")),
            )
            .with_page(
                PageData::new("/about")
                    .with_title("About")
                    .with_section(SectionData::new("Hero")),
            )
            .with_locale(Locale::new("en", "English").as_default())
            .with_locale(Locale::new("fr", "Français"))
    }

    fn demo_website() -> Website {
        Website::new(demo_site(), demo_registry()).unwrap()
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn builds_one_page_per_record() {
        let website = demo_website();
        assert_eq!(website.pages().len(), 2);
        assert_eq!(website.pages()[0].route(), "/");
        assert_eq!(website.pages()[1].route(), "/about");
        assert_eq!(website.pages()[1].no(), 1);
    }

    #[test]
    fn empty_site_is_an_error() {
        let err = Website::new(SiteData::new(), demo_registry()).unwrap_err();
        assert!(matches!(err, SiteError::NoPages));
    }

    #[test]
    fn site_with_only_special_pages_is_an_error() {
        let data = SiteData::new().with_page(PageData::new(HEADER_ROUTE));
        let err = Website::new(data, demo_registry()).unwrap_err();
        assert!(matches!(err, SiteError::NoPages));
    }

    #[test]
    fn duplicate_route_is_an_error() {
        let data = demo_site().with_page(PageData::new("/about"));
        let err = Website::new(data, demo_registry()).unwrap_err();
        assert!(matches!(err, SiteError::DuplicateRoute(route) if route == "/about"));
    }

    #[test]
    fn special_pages_fill_areas() {
        let data = demo_site().with_page(
            PageData::new(HEADER_ROUTE).with_section(SectionData::new("NavBar")),
        );
        let website = Website::new(data, demo_registry()).unwrap();
        assert_eq!(website.pages().len(), 2);
        for page in website.pages() {
            assert_eq!(page.header_blocks().unwrap().len(), 1);
        }
    }

    #[test]
    fn from_value_builds() {
        let website = Website::from_value(
            json!({"pages": [{"route": "/", "sections": [{"type": "Hero"}]}]}),
            demo_registry(),
        )
        .unwrap();
        assert_eq!(website.pages().len(), 1);
    }

    #[test]
    fn from_value_malformed() {
        let err = Website::from_value(json!({"pages": "nope"}), demo_registry()).unwrap_err();
        assert!(matches!(err, SiteError::Malformed(_)));
    }

    // ── Active page and navigation ───────────────────────────────────

    #[test]
    fn first_page_starts_active() {
        let website = demo_website();
        assert_eq!(website.active_page().route(), "/");
    }

    #[test]
    fn set_active_page() {
        let mut website = demo_website();
        website.set_active_page("/about").unwrap();
        assert_eq!(website.active_page().route(), "/about");
    }

    #[test]
    fn set_active_page_not_found() {
        let mut website = demo_website();
        let err = website.set_active_page("/missing").unwrap_err();
        assert!(matches!(err, SiteError::PageNotFound(route) if route == "/missing"));
        // The active page is untouched on a failed lookup.
        assert_eq!(website.active_page().route(), "/");
    }

    #[test]
    fn navigate_resets_block_state() {
        use crate::bridge::SignalHost;
        use serde_json::Value;

        let mut website = demo_website();
        let hero = website.active_page().body_blocks()[1];
        let mut host = SignalHost::new();
        let (_, setter) = website
            .active_page_mut()
            .use_block_state(hero, &mut host, json!({"open": false}))
            .unwrap();
        setter.set(json!({"open": true}));

        website.navigate("/").unwrap();
        let state = website.active_page().tree().get(hero).unwrap().state();
        assert_eq!(state, json!({"open": false}));
        assert_ne!(state, Value::Null);
    }

    // ── Locales and config ───────────────────────────────────────────

    #[test]
    fn locales_pass_through() {
        let website = demo_website();
        assert_eq!(website.locales().len(), 2);
        assert_eq!(website.active_locale().code, "en");
    }

    #[test]
    fn empty_locales_normalize_to_default() {
        let data = SiteData::new().with_page(PageData::new("/"));
        let website = Website::new(data, demo_registry()).unwrap();
        assert_eq!(website.locales().len(), 1);
        assert_eq!(website.active_locale().code, "en");
        assert!(website.active_locale().default);
    }

    #[test]
    fn active_locale_without_default_flag_is_first() {
        let data = SiteData::new()
            .with_page(PageData::new("/"))
            .with_locale(Locale::new("pt", "Português"))
            .with_locale(Locale::new("es", "Español"));
        let website = Website::new(data, demo_registry()).unwrap();
        assert_eq!(website.active_locale().code, "pt");
    }

    #[test]
    fn config_and_theme_pass_through() {
        let mut data = demo_site();
        data.config = json!({"analytics": false});
        data.theme = json!({"palette": "slate"});
        let website = Website::new(data, demo_registry()).unwrap();
        assert_eq!(website.config()["analytics"], json!(false));
        assert_eq!(website.theme()["palette"], json!("slate"));
    }

    // ── Rendering ────────────────────────────────────────────────────

    #[test]
    fn render_page_joins_blocks() {
        let website = demo_website();
        let html = website.render_page("/").unwrap();
        assert_eq!(html, "<nav></nav>\n<section>dark</section>");
    }

    #[test]
    fn render_page_unknown_route() {
        let website = demo_website();
        assert!(website.render_page("/missing").is_err());
    }

    #[test]
    fn unknown_component_renders_fallback_not_error() {
        let data = SiteData::new().with_page(
            PageData::new("/")
                .with_section(SectionData::new("Mystery"))
                .with_section(SectionData::new("NavBar")),
        );
        let website = Website::new(data, demo_registry()).unwrap();
        let html = website.render_page("/").unwrap();
        assert!(html.contains("unresolved-component"));
        assert!(html.contains("data-type=\"Mystery\""));
        // The sibling still rendered.
        assert!(html.contains("<nav></nav>"));
    }

    #[test]
    fn child_block_renderer_exposed() {
        let mut registry = Registry::new();
        registry.set_child_renderer(|page, ids| {
            format!("{}:{}", page.route(), ids.len())
        });
        let data = SiteData::new().with_page(
            PageData::new("/").with_section(
                SectionData::new("Tabs")
                    .with_subsection(SectionData::new("Tab"))
                    .with_subsection(SectionData::new("Tab")),
            ),
        );
        let website = Website::new(data, Rc::new(registry)).unwrap();
        let renderer = website.child_block_renderer().unwrap();

        let page = website.active_page();
        let tabs = page.body_blocks()[0];
        let out = renderer.as_ref()(page, page.tree().children(tabs));
        assert_eq!(out, "/:2");
    }
}
