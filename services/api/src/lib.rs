//! REST client for the snapfeed client core
//!
//! Wraps every endpoint the client consumes, injects the bearer credential
//! from the session guard, and validates user input before sending it.

pub mod client;
pub mod error;
pub mod models;
pub mod validation;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use models::{ChatUser, ContactRequest, ContactResponse, LoginResponse, ReportRequest};
