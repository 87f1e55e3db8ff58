//! Component resolution: registry trait, specs, render payload.
//!
//! Runtime polymorphism here is selected by data, not by static type: a
//! block carries a component type *name*, and the hosting environment maps
//! names to [`ComponentSpec`]s through a [`ComponentRegistry`]. Unresolved
//! names are never a hard error — resolution falls back to the registry's
//! default spec so one unknown type cannot take down a page.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::block::{Block, BlockId};
use crate::page::Page;
use crate::website::Website;

/// Render function of one component type.
pub type RenderFn = Rc<dyn Fn(&RenderPayload<'_>) -> String>;

/// Externally-registered delegate that renders a subset of child blocks.
///
/// Parent-type components (tabs, accordions) decide which children to pass
/// and in what order; the engine holds only composition data.
pub type ChildRenderFn = Rc<dyn Fn(&Page, &[BlockId]) -> String>;

// ---------------------------------------------------------------------------
// RenderPayload
// ---------------------------------------------------------------------------

/// The canonical payload handed to a component's render function.
pub struct RenderPayload<'a> {
    pub content: &'a Value,
    pub params: &'a Map<String, Value>,
    pub block: &'a Block,
    pub page: &'a Page,
    pub website: &'a Website,
}

// ---------------------------------------------------------------------------
// ComponentSpec
// ---------------------------------------------------------------------------

/// One renderable component type: render function plus declarations.
///
/// `state` is the declared initial state copied into each block's start
/// state; `context` is the type-scoped capability object shared by every
/// instance; `params` are per-param defaults merged underneath authored
/// frontmatter.
#[derive(Clone)]
pub struct ComponentSpec {
    render: RenderFn,
    state: Option<Value>,
    context: Value,
    params: Map<String, Value>,
}

impl ComponentSpec {
    /// Create a spec with the given render function and no declarations.
    pub fn new(render: impl Fn(&RenderPayload<'_>) -> String + 'static) -> Self {
        Self {
            render: Rc::new(render),
            state: None,
            context: Value::Null,
            params: Map::new(),
        }
    }

    /// Declare the initial state (builder).
    pub fn with_state(mut self, state: impl Into<Value>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Declare the type-scoped context (builder).
    pub fn with_context(mut self, context: impl Into<Value>) -> Self {
        self.context = context.into();
        self
    }

    /// Declare one param default (builder).
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Run the render function on a payload.
    pub fn render(&self, payload: &RenderPayload<'_>) -> String {
        self.render.as_ref()(payload)
    }

    /// The declared initial state, if any.
    pub fn state(&self) -> Option<&Value> {
        self.state.as_ref()
    }

    /// The declared context. `Null` when the type declares none.
    pub fn context(&self) -> &Value {
        &self.context
    }

    /// Declared param defaults.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }
}

impl fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("state", &self.state)
            .field("context", &self.context)
            .field("params", &self.params)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ComponentRegistry
// ---------------------------------------------------------------------------

/// The component-resolution boundary ("Foundation").
///
/// The engine treats a `None` from [`resolve`](Self::resolve) as "use the
/// fallback spec", never as an error.
pub trait ComponentRegistry {
    /// Look up a component type by name.
    fn resolve(&self, type_name: &str) -> Option<&ComponentSpec>;

    /// The spec used for unresolved type names. Always present.
    fn fallback(&self) -> &ComponentSpec;

    /// The externally-registered child-block render delegate, if any.
    fn child_renderer(&self) -> Option<ChildRenderFn> {
        None
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// In-memory registry with a replaceable fallback spec.
pub struct Registry {
    components: HashMap<String, ComponentSpec>,
    fallback: ComponentSpec,
    child_renderer: Option<ChildRenderFn>,
}

fn default_fallback() -> ComponentSpec {
    ComponentSpec::new(|payload| {
        format!(
            "<div class=\"unresolved-component\" data-type=\"{}\"></div>",
            payload.block.type_name()
        )
    })
}

impl Registry {
    /// Create a registry with the default fallback and no components.
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
            fallback: default_fallback(),
            child_renderer: None,
        }
    }

    /// Register a component type, replacing any previous spec for the name.
    pub fn register(&mut self, type_name: impl Into<String>, spec: ComponentSpec) {
        self.components.insert(type_name.into(), spec);
    }

    /// Register a component type (builder).
    pub fn with_component(mut self, type_name: impl Into<String>, spec: ComponentSpec) -> Self {
        self.register(type_name, spec);
        self
    }

    /// Replace the fallback spec.
    pub fn set_fallback(&mut self, spec: ComponentSpec) {
        self.fallback = spec;
    }

    /// Install the child-block render delegate.
    pub fn set_child_renderer(&mut self, f: impl Fn(&Page, &[BlockId]) -> String + 'static) {
        self.child_renderer = Some(Rc::new(f));
    }

    /// Whether a component type is registered under the given name.
    pub fn contains(&self, type_name: &str) -> bool {
        self.components.contains_key(type_name)
    }

    /// Number of registered component types (fallback excluded).
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no component types are registered.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl ComponentRegistry for Registry {
    fn resolve(&self, type_name: &str) -> Option<&ComponentSpec> {
        self.components.get(type_name)
    }

    fn fallback(&self) -> &ComponentSpec {
        &self.fallback
    }

    fn child_renderer(&self) -> Option<ChildRenderFn> {
        self.child_renderer.clone()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("components", &self.components.len())
            .field("child_renderer", &self.child_renderer.is_some())
            .finish()
    }
}
