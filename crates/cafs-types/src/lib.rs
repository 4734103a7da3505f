//! Foundation types for CAFS, the content-addressed file system DAG.
//!
//! This crate provides the one type every other CAFS crate depends on:
//! [`ObjectId`], the content address of a stored block. A block's address
//! is the BLAKE3 hash of its bytes — identical content always yields the
//! identical address, which is what makes blocks deduplicatable and
//! verifiable without coordination.

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::ObjectId;
