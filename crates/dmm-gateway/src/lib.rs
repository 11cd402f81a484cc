//! Venue gateway boundary for the depth market maker.
//!
//! - [`VenueGateway`]: the single collaborator the quoting core calls
//! - [`ErrorKind`] / [`VenueError`]: the only error shape the core branches on
//! - [`ErrorClassifier`]: per-venue table turning raw error text into kinds
//! - [`MockGateway`]: in-memory venue for tests and paper mode

pub mod classifier;
pub mod error;
pub mod gateway;
pub mod mock;

pub use classifier::{ErrorClassifier, ErrorRule};
pub use error::{ErrorKind, GatewayResult, VenueError};
pub use gateway::{BoxFuture, DynGateway, VenueGateway};
pub use mock::{GatewayCall, MockGateway, Operation, RestingOrder, CALL_LOG_CAPACITY};
