// Application layer - use cases and orchestration.
// Every operation takes the caller's role and the current date explicitly.

pub mod access;
pub mod error;
pub mod reporting;
pub mod service;

pub use access::*;
pub use error::*;
pub use reporting::*;
pub use service::*;
