//! # trellis
//!
//! A content-to-component runtime: binds structured content (parsed from
//! markdown/YAML upstream) to interchangeable UI components at render time,
//! keeping content authoring, component development, and rendering
//! independent of one another.
//!
//! The crate is the runtime object model and state-bridging engine: the
//! Website → Page → Block hierarchy rebuilt on every content load, the
//! protocol by which a block exposes itself to its neighbors for adaptive
//! rendering, and the bridge that synchronizes a block's persistent state
//! with a host UI framework's per-render reactive state. Parsing, component
//! bundling, routing, and asset serving are external collaborators.
//!
//! ## Core Systems
//!
//! - **[`content`]** — parser-facing data records: site, page, section, locale
//! - **[`block`]** — slotmap-backed block arena with tree operations and
//!   per-block state/context/params
//! - **[`page`]** — layout areas, flattened traversal, adjacency queries,
//!   the reference-wiring pass, state resets
//! - **[`website`]** — page set, active page, locales, render driver
//! - **[`registry`]** — component resolution with graceful fallback
//! - **[`bridge`]** — host-agnostic state-sync protocol plus a built-in
//!   signal host for headless use
//! - **[`error`]** — structural error taxonomy

// Inputs
pub mod content;
pub mod error;

// Object model
pub mod block;
pub mod page;
pub mod website;

// Boundaries
pub mod bridge;
pub mod registry;
