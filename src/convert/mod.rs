//! Element projection and output conversion
//!
//! - `classify`: map tag names onto the coarse element categories
//! - `view`: flatten the tree into id-linked element views
//! - `format`: beautify / compress / JSON text conversions

pub mod classify;
pub mod format;
pub mod view;

pub use classify::{classify, describe, ElementType};
pub use format::{beautify, compress, to_json};
pub use view::{to_element_views, ElementMetadata, ElementView};
