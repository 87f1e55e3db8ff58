//! Tree operations: build from sections, walk, look up.

use slotmap::{SecondaryMap, SlotMap};

use crate::content::SectionData;

use super::node::{Block, BlockId};

/// Empty slice constant for returning when a block has no children.
const EMPTY_CHILDREN: &[BlockId] = &[];

/// All block instances of one page, backed by a slotmap arena.
///
/// Blocks live in a single `SlotMap`; parent/child relationships sit in
/// secondary maps so lookup is O(1). Area roots are held by the owning
/// [`Page`](crate::page::Page), not the tree. Blocks are never removed
/// individually — the whole tree drops with its page.
pub struct BlockTree {
    blocks: SlotMap<BlockId, Block>,
    children: SecondaryMap<BlockId, Vec<BlockId>>,
    parent: SecondaryMap<BlockId, BlockId>,
}

impl BlockTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            blocks: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
        }
    }

    /// Insert a top-level (area root) block.
    pub(crate) fn insert(&mut self, block: Block) -> BlockId {
        let id = self.blocks.insert(block);
        self.children.insert(id, Vec::new());
        id
    }

    /// Insert a block as a child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub(crate) fn insert_child(&mut self, parent: BlockId, block: Block) -> BlockId {
        debug_assert!(
            self.blocks.contains_key(parent),
            "parent block does not exist"
        );
        let id = self.blocks.insert(block);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        id
    }

    /// Recursively build a block and its descendants from a section record.
    ///
    /// Every subsection becomes a child block with the derived uid
    /// `"{parent_uid}_{child_index}"`, so uids are stable and collision-free
    /// within the tree.
    pub(crate) fn build_section(&mut self, section: &SectionData, uid: String) -> BlockId {
        let id = self.insert(Block::from_section(section, uid.as_str()));
        for (index, subsection) in section.subsections.iter().enumerate() {
            self.build_subsection(id, subsection, format!("{uid}_{index}"));
        }
        id
    }

    fn build_subsection(&mut self, parent: BlockId, section: &SectionData, uid: String) {
        let id = self.insert_child(parent, Block::from_section(section, uid.as_str()));
        for (index, subsection) in section.subsections.iter().enumerate() {
            self.build_subsection(id, subsection, format!("{uid}_{index}"));
        }
    }

    /// Immutable access to a block.
    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// Mutable access to a block.
    pub(crate) fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    /// Ordered children of a block. Empty slice for leaves or unknown ids.
    pub fn children(&self, id: BlockId) -> &[BlockId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// The parent of a block, if it is not an area root.
    pub fn parent(&self, id: BlockId) -> Option<BlockId> {
        self.parent.get(id).copied()
    }

    /// Whether the tree contains a block with the given id.
    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(id)
    }

    /// Number of blocks in the tree.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: BlockId) -> Vec<BlockId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.blocks.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Find the block with the given position-path uid.
    ///
    /// Iterates the whole arena in slotmap order.
    pub fn find_by_uid(&self, uid: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .find(|(_, block)| block.uid() == uid)
            .map(|(id, _)| id)
    }

    /// Find all blocks of the given component type.
    pub fn find_by_type(&self, type_name: &str) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|(_, block)| block.type_name() == type_name)
            .map(|(id, _)| id)
            .collect()
    }
}

impl Default for BlockTree {
    fn default() -> Self {
        Self::new()
    }
}
