//! Safe SQL builder: identifiers from table metadata only, values as typed parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
