//! Resolution of a context name into a cluster address and credentials.

pub mod errors;
pub mod resolver;

pub use errors::ContextError;
pub use resolver::{ContextResolver, ContextTarget, ResolvedContext};
