//! Section renderers for the data table.

mod controls;
mod params;
mod table;

pub use controls::*;
pub use params::*;
pub use table::*;
