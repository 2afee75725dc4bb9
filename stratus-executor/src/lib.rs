//! Snippet execution against Azure Resource Manager for the Stratus
//! dispatcher.
//!
//! The [`RequestGate`] decodes requests and enforces the confirmation
//! handshake; the [`ExecutionEngine`] authenticates with a client secret,
//! builds the fixed client namespace, runs the snippet and normalizes its
//! `result` into a JSON envelope.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod catalog;
pub mod client;
pub mod config;
pub mod credential;
pub mod engine;
pub mod error;
pub mod gate;
pub mod http;
pub mod interpreter;
pub mod normalize;
pub mod paging;
pub mod pipeline;
pub mod poller;
pub mod registry;
pub mod transport;
pub mod value;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use backend::{Connector, Transport};
pub use config::EngineConfig;
pub use credential::{AccessToken, ClientSecretCredential, TokenCredential};
pub use engine::ExecutionEngine;
pub use error::ExecutorError;
pub use gate::RequestGate;
pub use registry::ClientRegistry;
pub use transport::{AzureConnector, ReqwestTransport};
pub use value::Output;
