//! Progressive rendering of deferred boundaries.
//!
//! This crate turns pending handles into output that updates in place:
//! - `ProgressiveRenderer` - Mounts boundaries and emits frames as they settle
//! - `BoundaryView` - Fallback, resolved and error markup for one boundary
//! - `ErrorView` - What a boundary shows when its unit fails
//! - `StreamingSink` - Shell-first HTML output of frames
//! - `Shell` - Page shell around the streamed content

mod boundary;
mod error;
mod fallback;
mod renderer;
mod shell;
mod sink;
mod swap;

pub use boundary::*;
pub use error::*;
pub use fallback::*;
pub use renderer::*;
pub use shell::*;
pub use sink::*;
pub use swap::*;
