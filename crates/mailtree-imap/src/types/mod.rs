//! Value types produced by the parser.
//!
//! Every tree is built in a single parse call and owned by its root.

mod envelope;
mod params;
mod part;
mod path;

pub use envelope::{Address, Envelope};
pub use params::{Disposition, Params};
pub use part::{BodyFields, Extension, Part, PartKind, Parts};
pub use path::PartPath;
