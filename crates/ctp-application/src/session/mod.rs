//! Session application services.
//!
//! This module contains the session store, the single owner of the
//! session state, and the persistence step it runs after each mutation.

mod persister;
mod store;

pub use persister::SessionPersister;
pub use store::SessionStore;
