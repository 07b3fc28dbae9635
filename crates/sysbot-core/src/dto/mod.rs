//! Response shapes for the fleet-control API.
//!
//! Every response carries an optional error and an optional timestamp, both
//! omitted from the wire when absent, plus a `success` flag that is derived
//! from the error on serialization and cannot be set independently.

mod records;
mod response;

pub use records::*;
pub use response::*;
