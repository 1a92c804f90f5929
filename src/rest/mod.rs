//! REST endpoint functions.
//!
//! One async function per authoring API endpoint. Each takes the
//! [`VisureClient`](crate::VisureClient) (base URL and bearer token) plus the
//! call's parameters and returns the decoded JSON body. Any non-2xx status
//! becomes [`VisureError::ApiError`](crate::VisureError::ApiError); nothing is
//! retried.

pub mod auth;
pub mod element;
pub mod project;
pub mod specification;
