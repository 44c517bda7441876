//! Domain models for Grandview

mod note;
mod record;
mod room;
mod staff;
mod task;

pub use note::*;
pub use record::*;
pub use room::*;
pub use staff::*;
pub use task::*;
