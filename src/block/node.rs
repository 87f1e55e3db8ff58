//! Block types: BlockId, Block, BlockInfo.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use slotmap::new_key_type;

use crate::bridge::{SetFn, SharedState, StateHost, StateSetter};
use crate::content::SectionData;
use crate::page::PageNo;
use crate::registry::ComponentSpec;

new_key_type! {
    /// Arena key for a block within its page's tree. Copy, lightweight (u64).
    pub struct BlockId;
}

/// Frontmatter keys consumed by the runtime itself; never visible in params.
const RESERVED_PARAMS: &[&str] = &["type", "theme"];

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// The runtime unit wrapping one content section.
///
/// A block binds a section's content and params to a component type, carries
/// per-instance mutable state and type-scoped immutable context, and holds a
/// non-owning back-reference to the page it was wired into. Blocks live in
/// their page's [`BlockTree`](crate::block::tree::BlockTree) for the whole
/// lifetime of that page; route re-entry resets their state but never
/// recreates them.
pub struct Block {
    /// Stable position-path id, e.g. `"0_2"` or `"0_2_1"` for its children.
    uid: String,
    type_name: String,
    theme: String,
    params: Map<String, Value>,
    content: Value,
    /// Shared with every live [`StateSetter`] for this block.
    state: SharedState,
    /// Type-scoped capability flags; frozen once the component resolves.
    context: Value,
    start_state: Option<Value>,
    /// Set by the page's wiring pass. `None` means queries bail out early.
    page: Option<PageNo>,
    /// Host-side update fn installed by the bridge; fired on state resets.
    reset: Option<SetFn>,
    fallback: bool,
}

impl Block {
    /// Build one block from a section record, stripping reserved params.
    ///
    /// Child recursion lives in
    /// [`BlockTree::build_section`](crate::block::tree::BlockTree::build_section),
    /// which derives child uids from this block's uid.
    pub(crate) fn from_section(section: &SectionData, uid: impl Into<String>) -> Self {
        let mut params = section.params.clone();
        for key in RESERVED_PARAMS {
            params.remove(*key);
        }
        Self {
            uid: uid.into(),
            type_name: section.type_name.clone(),
            theme: section.theme.clone(),
            params,
            content: section.content.clone(),
            state: Rc::new(RefCell::new(Value::Null)),
            context: Value::Null,
            start_state: None,
            page: None,
            reset: None,
            fallback: false,
        }
    }

    /// Adopt a resolved component's declarations.
    ///
    /// Copies the declared context (immutable from here on), snapshots the
    /// declared state as the reset target, and merges declared param
    /// defaults underneath the authored params.
    pub(crate) fn init_component(&mut self, spec: &ComponentSpec, fallback: bool) {
        self.fallback = fallback;
        self.context = spec.context().clone();
        self.start_state = spec.state().cloned();
        for (key, value) in spec.params() {
            self.params
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Record the owning page. Called only by the page's wiring pass.
    pub(crate) fn wire(&mut self, page: PageNo) {
        self.page = Some(page);
    }

    /// Reset state to the start snapshot and push it into the host slot.
    ///
    /// No-op for blocks that never declared or captured a start state.
    pub(crate) fn reset_state(&mut self) {
        let Some(start) = self.start_state.clone() else {
            return;
        };
        *self.state.borrow_mut() = start.clone();
        if let Some(notify) = &self.reset {
            notify.as_ref()(start);
        }
    }

    /// Connect this block's state to a host's reactive cycle.
    ///
    /// Captures `initial` as the start state iff the component declared
    /// none, registers a slot with the host, installs the reset trigger used
    /// by [`Page::init_state`](crate::page::Page::init_state), and returns
    /// the slot's current value plus a setter that updates the host slot and
    /// this block's state in the same synchronous call.
    pub fn use_state(
        &mut self,
        host: &mut dyn StateHost,
        initial: Value,
    ) -> (Value, StateSetter) {
        let seed = self.start_state.get_or_insert(initial).clone();
        let slot = host.register(seed);
        *self.state.borrow_mut() = slot.value.clone();
        self.reset = Some(Rc::clone(&slot.set));
        let setter = StateSetter::new(Rc::clone(&self.state), slot.set);
        (slot.value, setter)
    }

    /// Read-only snapshot for cross-block queries.
    pub fn info(&self) -> BlockInfo {
        BlockInfo {
            type_name: self.type_name.clone(),
            theme: self.theme.clone(),
            state: self.state.borrow().clone(),
            context: self.context.clone(),
        }
    }

    /// Stable position-path id.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Component type name as authored.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Theme name applied to this block.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Resolved params: authored frontmatter over component defaults.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Pre-parsed structured content body.
    pub fn content(&self) -> &Value {
        &self.content
    }

    /// Current per-instance state.
    pub fn state(&self) -> Value {
        self.state.borrow().clone()
    }

    /// Type-scoped immutable context.
    pub fn context(&self) -> &Value {
        &self.context
    }

    /// The declared or captured start-state snapshot.
    pub fn start_state(&self) -> Option<&Value> {
        self.start_state.as_ref()
    }

    /// The owning page's number, once wired.
    pub fn page(&self) -> Option<PageNo> {
        self.page
    }

    /// Whether the component resolved through the fallback spec.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Whether a host is currently connected through the bridge.
    pub fn is_connected(&self) -> bool {
        self.reset.is_some()
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("uid", &self.uid)
            .field("type_name", &self.type_name)
            .field("theme", &self.theme)
            .field("page", &self.page)
            .field("connected", &self.is_connected())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// BlockInfo
// ---------------------------------------------------------------------------

/// Read-only info snapshot a block exposes to its neighbors.
///
/// All fields are clones; mutating them never touches the source block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockInfo {
    pub type_name: String,
    pub theme: String,
    pub state: Value,
    pub context: Value,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::bridge::SignalHost;
    use crate::registry::ComponentSpec;

    use super::*;

    fn hero_section() -> SectionData {
        SectionData::new("Hero")
            .with_theme("dark")
            .with_param("align", "center")
            .with_content(json!({"main": {"title": "Welcome"}}))
    }

    #[test]
    fn from_section_copies_fields() {
        let block = Block::from_section(&hero_section(), "0_0");
        assert_eq!(block.uid(), "0_0");
        assert_eq!(block.type_name(), "Hero");
        assert_eq!(block.theme(), "dark");
        assert_eq!(block.params()["align"], json!("center"));
        assert_eq!(block.content()["main"]["title"], json!("Welcome"));
    }

    #[test]
    fn from_section_strips_reserved_params() {
        let section = hero_section()
            .with_param("type", "Sneaky")
            .with_param("theme", "light");
        let block = Block::from_section(&section, "0_0");
        assert!(!block.params().contains_key("type"));
        assert!(!block.params().contains_key("theme"));
        assert_eq!(block.type_name(), "Hero");
        assert_eq!(block.theme(), "dark");
    }

    #[test]
    fn fresh_block_is_unwired_and_disconnected() {
        let block = Block::from_section(&hero_section(), "0_0");
        assert_eq!(block.page(), None);
        assert!(!block.is_connected());
        assert_eq!(block.state(), Value::Null);
        assert_eq!(*block.context(), Value::Null);
    }

    #[test]
    fn init_component_copies_declarations() {
        let spec = ComponentSpec::new(|_| String::new())
            .with_state(json!({"open": false}))
            .with_context(json!({"allowTranslucentTop": true}))
            .with_param("align", "left")
            .with_param("columns", 2);
        let mut block = Block::from_section(&hero_section(), "0_0");
        block.init_component(&spec, false);

        assert_eq!(*block.context(), json!({"allowTranslucentTop": true}));
        assert_eq!(block.start_state(), Some(&json!({"open": false})));
        // Authored params win; missing ones fill in from the declaration.
        assert_eq!(block.params()["align"], json!("center"));
        assert_eq!(block.params()["columns"], json!(2));
        assert!(!block.is_fallback());
        // State stays untouched until the bridge connects.
        assert_eq!(block.state(), Value::Null);
    }

    #[test]
    fn info_snapshot() {
        let mut block = Block::from_section(&hero_section(), "0_0");
        block.init_component(
            &ComponentSpec::new(|_| String::new()).with_context(json!({"wide": true})),
            false,
        );
        let info = block.info();
        assert_eq!(info.type_name, "Hero");
        assert_eq!(info.theme, "dark");
        assert_eq!(info.state, Value::Null);
        assert_eq!(info.context, json!({"wide": true}));
    }

    #[test]
    fn info_is_detached_from_block() {
        let block = Block::from_section(&hero_section(), "0_0");
        let mut info = block.info();
        info.state = json!("mutated");
        assert_eq!(block.state(), Value::Null);
    }

    #[test]
    fn use_state_captures_initial_when_undeclared() {
        let mut host = SignalHost::new();
        let mut block = Block::from_section(&hero_section(), "0_0");
        let (value, _setter) = block.use_state(&mut host, json!({"count": 0}));

        assert_eq!(value, json!({"count": 0}));
        assert_eq!(block.start_state(), Some(&json!({"count": 0})));
        assert_eq!(block.state(), json!({"count": 0}));
        assert!(block.is_connected());
    }

    #[test]
    fn use_state_prefers_declared_start_state() {
        let mut host = SignalHost::new();
        let mut block = Block::from_section(&hero_section(), "0_0");
        block.init_component(
            &ComponentSpec::new(|_| String::new()).with_state(json!({"open": true})),
            false,
        );
        let (value, _setter) = block.use_state(&mut host, json!({"open": false}));

        assert_eq!(value, json!({"open": true}));
        assert_eq!(block.start_state(), Some(&json!({"open": true})));
    }

    #[test]
    fn setter_keeps_host_and_block_in_sync() {
        let mut host = SignalHost::new();
        let mut block = Block::from_section(&hero_section(), "0_0");
        let (_value, setter) = block.use_state(&mut host, json!(0));

        setter.set(json!(41));
        assert_eq!(block.state(), json!(41));
        assert_eq!(host.value(0), Some(json!(41)));
    }

    #[test]
    fn reset_state_restores_start_and_notifies_host() {
        let mut host = SignalHost::new();
        let mut block = Block::from_section(&hero_section(), "0_0");
        let (_value, setter) = block.use_state(&mut host, json!({"count": 0}));
        setter.set(json!({"count": 9}));

        block.reset_state();
        assert_eq!(block.state(), json!({"count": 0}));
        assert_eq!(host.value(0), Some(json!({"count": 0})));
    }

    #[test]
    fn reset_state_without_start_state_is_noop() {
        let mut block = Block::from_section(&hero_section(), "0_0");
        block.reset_state();
        assert_eq!(block.state(), Value::Null);
    }

    #[test]
    fn wire_records_page() {
        let mut block = Block::from_section(&hero_section(), "0_0");
        block.wire(3);
        assert_eq!(block.page(), Some(3));
    }

    #[test]
    fn block_id_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<BlockId>();
    }

    #[test]
    fn debug_skips_callbacks() {
        let block = Block::from_section(&hero_section(), "0_0");
        let dbg = format!("{block:?}");
        assert!(dbg.contains("Hero"));
        assert!(dbg.contains("connected"));
    }
}
