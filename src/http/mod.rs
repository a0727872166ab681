//! # HTTP Execution
//!
//! The retrying request pipeline shared by every outbound call: metadata
//! lookups, secret access, secret creation and version add.

pub mod body;
pub mod executor;

pub use body::{read_capped, CappedBody};
pub use executor::{Attempt, Executor, RawResponse, RequestSpec, RetryPolicy};
