pub mod node_kind;
pub mod source_location;
pub mod tree;

pub use node_kind::NodeKind;
pub use source_location::SourceLocation;
pub use tree::{NodeId, NodeToken, PostOrder, Tree};
