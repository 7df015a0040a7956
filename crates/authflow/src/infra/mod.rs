//! Infrastructure Layer
//!
//! Concrete identity provider backends.

pub mod memory;

pub use memory::MemoryIdentityProvider;
