//! Document tree: typed nodes, stack-based builder, markup serialization

pub mod builder;
pub mod markup;
pub mod node;

pub use builder::{build_from_events, build_tree};
pub use markup::to_markup;
pub use node::Node;
