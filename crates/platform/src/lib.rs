//! Typed clients for the managed platform behind the Homeboy backend.
//!
//! The platform owns persistence (document collections), the user directory,
//! and push delivery. This crate exposes one dyn-safe trait per service with
//! an HTTP implementation for production and an in-memory implementation for
//! tests; nothing above this layer talks to the vendor API directly.

pub mod documents;
pub mod error;
pub mod identity;
pub mod messaging;

pub use documents::{Document, DocumentStore, MemoryDocumentStore, RestDocumentStore};
pub use error::{PlatformError, PlatformResult};
pub use identity::{
    IdentityProvider, MemoryIdentityProvider, RestIdentityProvider, SignInResponse, UserRecord,
};
pub use messaging::{MemoryPushGateway, PushGateway, PushMessage, RestPushGateway};
