pub mod model;
pub mod validate;

pub use model::{classify_kind, ContentKind, ContentRecord};
