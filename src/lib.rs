//! Timeline layout engine for a portfolio Gantt view.
//!
//! Projects share one month-aligned coordinate system; each project can be
//! expanded to lazily fetch its tasks exactly once.

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod source;

pub use error::{TimelineError, TimelineResult};
