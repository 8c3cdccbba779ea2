//! Client for the managed workflow service.
//!
//! [`FlowInvoker`] is the seam the pipeline depends on. [`FlowClient`] is the
//! HTTP implementation; with the `testing` feature enabled, [`MockInvoker`]
//! provides scripted responses for tests.

pub mod client;
pub mod error;
pub mod invoker;

pub use client::{ClientBuilder, FlowClient};
pub use error::{InvokeError, Result};
pub use invoker::{FlowInvoker, ResultEnvelope, SharedInvoker};

#[cfg(any(test, feature = "testing"))]
pub use invoker::{MockInvoker, RecordedCall};
