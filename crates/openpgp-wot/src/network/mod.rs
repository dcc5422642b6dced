//! The trust graph and its construction.
//!
//! [`NetworkBuilder`] turns a snapshot of certificates (anything
//! implementing [`Certificate`]) plus a [`SignatureVerifier`] into an
//! immutable [`Network`].

pub mod builder;
pub mod graph;
pub mod source;

pub use builder::NetworkBuilder;
pub use graph::{Network, NetworkAssembler};
pub use source::{Certificate, Signature, SignatureVerifier};
