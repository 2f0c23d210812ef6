//! Domain layer: node model, validation and tree construction
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod ids;
pub mod params;

pub use arena::{BreadthFirst, FaultTree};
pub use builder::TreeBuilder;
pub use entities::*;
pub use error::{ConfigurationError, ConfigurationResult};
pub use ids::IdAllocator;
pub use params::{TreeParams, TreeShape, MAX_REUSE, MIN_CHILDREN};
