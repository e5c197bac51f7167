//! Section renderers for the deferred route.

mod page;
mod person;
mod stuff;

pub use page::*;
pub use person::*;
pub use stuff::*;
