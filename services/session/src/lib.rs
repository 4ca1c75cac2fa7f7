//! Session guard for the snapfeed client
//!
//! Decides whether the persisted credential is still usable, owns the
//! in-memory session derived from it, and gates routes on the result.

pub mod credential;
pub mod error;
pub mod guard;
pub mod store;

pub use error::{CredentialError, SessionError, SessionResult};
pub use guard::{Access, Decision, Navigator, RouteGuard, RoutePaths, guard_route};
pub use store::{Session, SessionStore, SlotKeys};
