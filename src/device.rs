//! Device model: the remote JSON:API wire schema, the flat internal status record, the
//! translator between them, and the control actions the remote API accepts.

pub mod action;
pub mod remote;
pub mod status;
pub mod translate;

pub use action::*;
pub use status::*;
pub use translate::*;
