//! HTTP gateway for the Stratus confirmed cloud-operation dispatcher.
//!
//! Accepts operation requests with their service-principal credentials and
//! answers with the request gate's response.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod routes;
