//! Provider base: capability fallback and debug event sink.
//!
//! [`NearRpcProvider`](super::NearRpcProvider) answers the capabilities it
//! understands itself and hands every other `perform` call to its base.
//! Each round trip is also reported to the base as a [`DebugEvent`].
//!
//! # Example
//!
//! ```rust
//! use futures::future::BoxFuture;
//! use near_rpc_provider::{DebugEvent, Error, ProviderBase};
//! use serde_json::Value;
//!
//! struct Logged;
//!
//! impl ProviderBase for Logged {
//!     fn perform<'a>(
//!         &'a self,
//!         method: &'a str,
//!         _params: &'a Value,
//!     ) -> BoxFuture<'a, Result<Value, Error>> {
//!         Box::pin(async move { Ok(Value::String(method.to_string())) })
//!     }
//!
//!     fn emit(&self, event: &DebugEvent<'_>) {
//!         println!("{} {}", event.action, event.request.method);
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use super::codec::RpcRequest;
use crate::error::Error;

/// Phase of a round trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebugAction {
    /// Before the request is sent (or answered from cache).
    Request,
    /// After the primary endpoint answered.
    Response,
    /// After the archival endpoint answered a fallback request.
    ResponseArchival,
}

impl DebugAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebugAction::Request => "request",
            DebugAction::Response => "response",
            DebugAction::ResponseArchival => "response_archival",
        }
    }
}

impl fmt::Display for DebugAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a round trip produced.
#[derive(Clone, Copy, Debug)]
pub enum DebugOutcome<'a> {
    Response(&'a Value),
    Error(&'a Error),
}

/// One observed phase of a round trip.
#[derive(Clone, Copy, Debug)]
pub struct DebugEvent<'a> {
    pub action: DebugAction,
    pub request: &'a RpcRequest,
    /// `None` for [`DebugAction::Request`].
    pub outcome: Option<DebugOutcome<'a>>,
}

impl<'a> DebugEvent<'a> {
    pub fn request(request: &'a RpcRequest) -> Self {
        Self {
            action: DebugAction::Request,
            request,
            outcome: None,
        }
    }

    pub fn finished(
        action: DebugAction,
        request: &'a RpcRequest,
        result: &'a Result<Value, Error>,
    ) -> Self {
        let outcome = match result {
            Ok(value) => DebugOutcome::Response(value),
            Err(err) => DebugOutcome::Error(err),
        };
        Self {
            action,
            request,
            outcome: Some(outcome),
        }
    }

    pub fn response(&self) -> Option<&'a Value> {
        match self.outcome {
            Some(DebugOutcome::Response(value)) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&'a Error> {
        match self.outcome {
            Some(DebugOutcome::Error(err)) => Some(err),
            _ => None,
        }
    }
}

/// Listener registered with `ProviderBuilder::on_debug`.
pub type DebugListener = Arc<dyn Fn(&DebugEvent<'_>) + Send + Sync>;

/// Generic capabilities the provider delegates to.
pub trait ProviderBase: Send + Sync {
    /// Handle a capability the provider does not understand.
    fn perform<'a>(
        &'a self,
        method: &'a str,
        _params: &'a Value,
    ) -> BoxFuture<'a, Result<Value, Error>> {
        Box::pin(async move {
            Err(Error::unsupported(method, format!("{method} not implemented")))
        })
    }

    /// Observe a round trip phase.
    fn emit(&self, _event: &DebugEvent<'_>) {}
}

/// Base that supports no extra capabilities and ignores events.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultBase;

impl ProviderBase for DefaultBase {}
