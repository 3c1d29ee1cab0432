//! Domain types for load balancer cloning
//!
//! Pure data types with no transport dependencies: the object kinds the
//! cloner understands, the generic object envelope, references between
//! objects and the immutable parameters of one clone run.

pub mod kind;
pub mod object;
pub mod reference;
pub mod request;
pub mod tree;

pub use kind::Kind;
pub use object::ConfigObject;
pub use reference::{ObjectKey, ObjectReference, SHARED_NAMESPACE};
pub use request::{CloneRequest, DomainStrategy, TlsMode};
