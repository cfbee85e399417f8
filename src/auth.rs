//! Auth-domain identifiers, scope lists, and persisted records.

pub mod id;
pub mod record;
pub mod scope;

pub use id::*;
pub use record::*;
pub use scope::*;
