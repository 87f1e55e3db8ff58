//! Page: layout areas, traversal order, adjacency queries, state resets.
//!
//! A [`Page`] owns every block instance rendered for one route, grouped into
//! five layout areas. Construction is two-phase: build all areas' blocks,
//! then run a recursive wiring pass that stamps the page back-reference onto
//! every block and descendant — no block is ever observable unwired once
//! `build` returns. The flattened header + body + footer order is
//! authoritative for positional and adjacency queries.

use serde_json::Value;

use crate::block::{Block, BlockId, BlockInfo, BlockTree};
use crate::bridge::{StateHost, StateSetter};
use crate::content::{PageData, SectionData};
use crate::registry::ComponentRegistry;

/// A page's position inside its website; doubles as the non-owning
/// back-reference blocks carry.
pub type PageNo = usize;

/// Section lists extracted from the site's special pages, instantiated into
/// the matching layout area of every page that opts in.
#[derive(Debug, Clone, Default)]
pub struct SpecialSections {
    pub header: Option<Vec<SectionData>>,
    pub footer: Option<Vec<SectionData>>,
    pub left: Option<Vec<SectionData>>,
    pub right: Option<Vec<SectionData>>,
}

fn area_ids(area: &Option<Vec<BlockId>>) -> &[BlockId] {
    area.as_deref().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// One routable unit of content.
pub struct Page {
    no: PageNo,
    route: String,
    title: String,
    description: String,
    tree: BlockTree,
    header: Option<Vec<BlockId>>,
    body: Vec<BlockId>,
    footer: Option<Vec<BlockId>>,
    left: Option<Vec<BlockId>>,
    right: Option<Vec<BlockId>>,
}

impl Page {
    /// Build a page from its record and the site's special sections.
    ///
    /// Areas materialize in header, body, footer, left, right order with one
    /// running uid counter, so top-level uids are unique across areas.
    /// `header`/`footer`/`left`/`right` stay `None` unless the site defines
    /// the special page *and* this page opts in; `body` is always present.
    pub fn build(data: &PageData, no: PageNo, specials: &SpecialSections) -> Self {
        let mut tree = BlockTree::new();
        let mut counter = 0usize;

        let header = data
            .header
            .then(|| specials.header.as_ref())
            .flatten()
            .map(|sections| build_area(&mut tree, no, &mut counter, sections));
        let body = build_area(&mut tree, no, &mut counter, &data.sections);
        let footer = data
            .footer
            .then(|| specials.footer.as_ref())
            .flatten()
            .map(|sections| build_area(&mut tree, no, &mut counter, sections));
        let left = data
            .left
            .then(|| specials.left.as_ref())
            .flatten()
            .map(|sections| build_area(&mut tree, no, &mut counter, sections));
        let right = data
            .right
            .then(|| specials.right.as_ref())
            .flatten()
            .map(|sections| build_area(&mut tree, no, &mut counter, sections));

        let mut page = Self {
            no,
            route: data.route.clone(),
            title: data.title.clone(),
            description: data.description.clone(),
            tree,
            header,
            body,
            footer,
            left,
            right,
        };
        page.wire_blocks();
        page
    }

    /// Stamp the page back-reference onto every block and descendant.
    fn wire_blocks(&mut self) {
        let no = self.no;
        for id in self.all_block_ids() {
            if let Some(block) = self.tree.get_mut(id) {
                block.wire(no);
            }
        }
        log::debug!(
            "page {} ({:?}): wired {} blocks",
            no,
            self.route,
            self.tree.len()
        );
    }

    /// Resolve every block's component type against the registry.
    ///
    /// Unknown types degrade to the registry's fallback spec; they never
    /// abort the page.
    pub fn init_components(&mut self, registry: &dyn ComponentRegistry) {
        for id in self.all_block_ids() {
            let Some(type_name) = self.tree.get(id).map(|b| b.type_name().to_owned()) else {
                continue;
            };
            let (spec, fallback) = match registry.resolve(&type_name) {
                Some(spec) => (spec, false),
                None => {
                    log::warn!(
                        "page {}: no component for type {:?}, using fallback",
                        self.no,
                        type_name
                    );
                    (registry.fallback(), true)
                }
            };
            if let Some(block) = self.tree.get_mut(id) {
                block.init_component(spec, fallback);
            }
        }
    }

    /// Reset every block in the page tree — all descendants included — to
    /// its start state, pushing the reset through any connected host.
    pub fn init_state(&mut self) {
        for id in self.all_block_ids() {
            if let Some(block) = self.tree.get_mut(id) {
                block.reset_state();
            }
        }
    }

    /// The flattened, order-preserving sequence of rendered blocks:
    /// header (if present) + body + footer (if present).
    ///
    /// Left/right blocks render in separate regions and are excluded here;
    /// query them through [`left_blocks`](Self::left_blocks) and
    /// [`right_blocks`](Self::right_blocks).
    pub fn page_blocks(&self) -> Vec<BlockId> {
        let mut blocks = Vec::new();
        blocks.extend_from_slice(area_ids(&self.header));
        blocks.extend_from_slice(&self.body);
        blocks.extend_from_slice(area_ids(&self.footer));
        blocks
    }

    /// 0-based position of a block within [`page_blocks`](Self::page_blocks).
    ///
    /// `None` for child blocks, unknown ids, and blocks not yet wired to
    /// this page. Linear scan — fine for typical pages of tens of blocks, a
    /// known scaling limit for hundreds.
    pub fn block_index(&self, id: BlockId) -> Option<usize> {
        self.tree.get(id)?.page()?;
        self.page_blocks().iter().position(|&b| b == id)
    }

    /// Info snapshot of the block at `index`, or `None` if out of range.
    pub fn block_info(&self, index: usize) -> Option<BlockInfo> {
        let id = self.page_blocks().get(index).copied()?;
        self.tree.get(id).map(Block::info)
    }

    /// Info snapshot of the first body block, if the body is non-empty.
    pub fn first_body_block_info(&self) -> Option<BlockInfo> {
        self.body
            .first()
            .and_then(|&id| self.tree.get(id))
            .map(Block::info)
    }

    /// Info snapshot of the block after `id`, or `None` at the end.
    pub fn next_block_info(&self, id: BlockId) -> Option<BlockInfo> {
        let index = self.block_index(id)?;
        self.block_info(index + 1)
    }

    /// Info snapshot of the block before `id`, or `None` at the start.
    pub fn prev_block_info(&self, id: BlockId) -> Option<BlockInfo> {
        let index = self.block_index(id)?;
        index.checked_sub(1).and_then(|i| self.block_info(i))
    }

    /// Connect a block's state to a host. `None` for unknown ids.
    pub fn use_block_state(
        &mut self,
        id: BlockId,
        host: &mut dyn StateHost,
        initial: Value,
    ) -> Option<(Value, StateSetter)> {
        self.tree
            .get_mut(id)
            .map(|block| block.use_state(host, initial))
    }

    /// This page's position inside its website.
    pub fn no(&self) -> PageNo {
        self.no
    }

    /// URL path of this page.
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Read access to the block arena.
    pub fn tree(&self) -> &BlockTree {
        &self.tree
    }

    /// Top-level body blocks, in authored order. Always present.
    pub fn body_blocks(&self) -> &[BlockId] {
        &self.body
    }

    /// Top-level header blocks, if the area materialized.
    pub fn header_blocks(&self) -> Option<&[BlockId]> {
        self.header.as_deref()
    }

    /// Top-level footer blocks, if the area materialized.
    pub fn footer_blocks(&self) -> Option<&[BlockId]> {
        self.footer.as_deref()
    }

    /// Top-level left-area blocks, if the area materialized.
    pub fn left_blocks(&self) -> Option<&[BlockId]> {
        self.left.as_deref()
    }

    /// Top-level right-area blocks, if the area materialized.
    pub fn right_blocks(&self) -> Option<&[BlockId]> {
        self.right.as_deref()
    }

    /// Every block id in the tree, all areas, depth-first per root.
    fn all_block_ids(&self) -> Vec<BlockId> {
        let mut roots: Vec<BlockId> = Vec::new();
        roots.extend_from_slice(area_ids(&self.header));
        roots.extend_from_slice(&self.body);
        roots.extend_from_slice(area_ids(&self.footer));
        roots.extend_from_slice(area_ids(&self.left));
        roots.extend_from_slice(area_ids(&self.right));

        let mut ids = Vec::new();
        for root in roots {
            ids.extend(self.tree.walk_depth_first(root));
        }
        ids
    }
}

fn build_area(
    tree: &mut BlockTree,
    no: PageNo,
    counter: &mut usize,
    sections: &[SectionData],
) -> Vec<BlockId> {
    sections
        .iter()
        .map(|section| {
            let uid = format!("{no}_{}", *counter);
            *counter += 1;
            tree.build_section(section, uid)
        })
        .collect()
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("no", &self.no)
            .field("route", &self.route)
            .field("blocks", &self.tree.len())
            .finish()
    }
}
