//! Block model: the arena tree and the per-block record.

pub mod node;
pub mod tree;

pub use node::{Block, BlockId, BlockInfo};
pub use tree::BlockTree;
