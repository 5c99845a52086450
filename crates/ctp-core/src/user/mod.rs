//! User domain module.
//!
//! # Usage
//!
//! ```ignore
//! use ctp_core::user::User;
//! ```

mod model;

pub use model::User;
