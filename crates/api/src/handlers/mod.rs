//! Request handlers.
//!
//! Handlers authenticate via the [`ServiceAuth`](crate::middleware::auth::ServiceAuth)
//! extractor, delegate to the sync engine, and map errors via
//! [`AppError`](crate::error::AppError).

pub mod sync;
