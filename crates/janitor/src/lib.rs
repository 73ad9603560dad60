//! Release resources in bulk, exactly once.
//!
//! A [`Group`] collects items (subscriptions, owned objects, deferred
//! callbacks, or anything else) together with the function that releases
//! them. Freeing the group releases every item it still holds, in the order
//! they were added, and then frees the child groups spawned from it.
//!
//! ## Key Components
//!
//! - **`group`**: `Group`, its builder, and the `DisconnectFn` handles that
//!   withdraw the items of a single add call.
//! - **`adapters`**: Ready-made handlers for callbacks, connections, and
//!   destroyable objects.
//! - **`telemetry`**: Tracing subscriber setup.

pub mod adapters;
pub mod group;
pub mod telemetry;

pub use adapters::{Callback, Destroy, Disconnect};
pub use group::{CleanupHandler, DisconnectFn, Group, GroupBuilder};
pub use janitor_core::{CleanupFailure, Error, FailurePolicy, GroupConfig, Result};
