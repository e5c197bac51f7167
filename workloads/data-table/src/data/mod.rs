//! Data models for the data table.

mod item;
mod search;

pub use item::*;
pub use search::*;
