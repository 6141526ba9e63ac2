//! Request payloads and their validation.
//!
//! - [`request`]: typed [`StartRequest`], [`StopRequest`], [`Termination`];
//! - [`parse`]: payload → typed request, or [`RequestError`](crate::RequestError).

mod parse;
mod request;

pub use parse::{parse_start, parse_stop};
pub use request::{StartRequest, StopRequest, Termination};
