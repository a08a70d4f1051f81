//! Data types shared by the codec, the synchronizer and the projector.

mod config;
mod grid;
mod query;

pub use config::*;
pub use grid::*;
pub use query::*;
