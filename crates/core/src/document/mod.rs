pub mod codec;
pub mod node;

pub use codec::Document;
pub use node::{LeafValue, Node};
