//! Remote search controllers
//!
//! The behavioral core of the searchable select widgets: debounced input,
//! remote lookup, selection state. Rendering stays with the consumer.

pub mod debounce;
pub mod multi;
pub mod select;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use multi::{MultiConfig, MultiSelect};
pub use select::{FieldAccessor, Phase, SearchSelect, SelectConfig};
