mod errors;
mod policy;

pub use errors::AccessError;
pub use policy::{authorize, Caller, Query, Role, RowScope};
