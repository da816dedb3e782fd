//! tfmock - mock provider backend for provisioning-protocol tests
//!
//! A fake implementation of the Terraform-style provider callback surface,
//! backed by an in-memory resource store. Tests of the host orchestrator
//! construct a [`MockProvider`], drive it through the [`provider::Provider`]
//! callbacks, and inspect or seed the shared [`ResourceStore`].
//!
//! Every provider must be closed before it goes out of scope; dropping an
//! unclosed provider fails the test.

// Core modules
pub mod error;
pub mod schema;
pub mod types;

// Callback surface and its mock implementation
pub mod mock;
pub mod provider;
pub mod resources;
pub mod store;

// Re-exports for convenience
pub use error::{Result, TfMockError};
pub use mock::MockProvider;
pub use provider::Provider;
pub use schema::{AttributeBuilder, AttributeMode, AttributeType, Schema, SchemaBuilder};
pub use store::ResourceStore;
pub use types::{
    AttributePath, Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue,
};
