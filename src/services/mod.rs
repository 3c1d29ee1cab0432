//! Clone services
//!
//! Everything between the object store and the command line: finding
//! references, rewriting bodies, checking certificates and ordering copies.

pub mod certificate_verifier;
pub mod clone_plan;
pub mod cloner;
pub mod reference_extractor;
pub mod sanitizer;

pub use certificate_verifier::CertificateVerifier;
pub use clone_plan::{ClonePlan, PlanNode};
pub use cloner::{CloneOptions, CloneReport, Cloner, CopyOutcome, CopyRecord};
pub use reference_extractor::ReferenceExtractor;
pub use sanitizer::{derive_domain, Sanitizer};
