mod dimension;
mod models;

pub use dimension::{Dimension, DimensionKind};
pub use models::*;
