//! Core of the content management API client.
//!
//! Endpoint wiring is mechanical; this crate holds the parts that are not:
//! - [`Dispatcher`]: routes `(entity type, action)` pairs to registered
//!   handlers, aliasing `delete` to `del` and injecting the caller-agent header
//! - [`PlainClient`] / [`BoundAction`]: bind actions to a configuration's
//!   default space/environment/organization identifiers (explicit params win)
//! - [`CompletionPoller`] and [`AssetProcessor`]: wait for out-of-band asset
//!   processing, one concurrent poll per locale
//! - [`normalize_select`] and [`Collection`]: keep wrapped items usable after
//!   field selection and preserve pagination when wrapping
//!
//! HTTP lives behind the [`Transport`] trait; `cma-http` provides the
//! reqwest implementation.
//!
//! # Example
//!
//! ```
//! use cma_core::{Dispatcher, PlainClient, DefaultParams, Registry};
//! # use cma_core::{CmaResult, HttpRequest, Transport};
//! # use std::sync::Arc;
//! # struct Offline;
//! # #[async_trait::async_trait]
//! # impl Transport for Offline {
//! #     async fn request(&self, _request: HttpRequest) -> CmaResult<serde_json::Value> {
//! #         Ok(serde_json::Value::Null)
//! #     }
//! # }
//!
//! let dispatcher = Dispatcher::new(Arc::new(Offline), Arc::new(Registry::with_default_endpoints()));
//! let client = PlainClient::new(
//!     dispatcher,
//!     DefaultParams {
//!         space_id: Some("space".to_string()),
//!         ..Default::default()
//!     },
//! );
//! let get_space = client.bind("Space", "get");
//! assert_eq!(get_space.action(), "get");
//! ```

mod client;
pub mod collection;
mod dispatch;
pub mod endpoints;
mod error;
pub mod params;
pub mod poller;
pub mod query;
mod registry;
mod transport;
pub mod validation;

pub use client::{BoundAction, PlainClient};
pub use collection::{Collection, CursorPages, Pagination, wrap_collection};
pub use dispatch::{ActionDescriptor, Dispatcher, USER_AGENT_HEADER, resolve_action};
pub use endpoints::asset::AssetProcessor;
pub use error::{CmaError, CmaResult, HttpError};
pub use params::{
    DefaultParams, Headers, IdentifierKey, Params, PatchKind, PatchOp, Payload, VERSION_HEADER,
    merge_defaults,
};
pub use poller::{CompletionPoller, Delay, ProcessingOptions, TokioDelay, settle_all_last_wins};
pub use query::normalize_select;
pub use registry::{Endpoint, Handler, HandlerFuture, Registry};
pub use transport::{HttpRequest, Method, RequestConfig, Transport};
pub use validation::{Clock, FixedClock, SystemClock, TimestampBounds, validate_timestamp};
