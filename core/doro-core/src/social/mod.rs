//! Social graph state: per-row follow controls, follow lists and the incoming
//! request inbox.
//!
//! Each [`FollowControl`] is independent; two rows never share state or
//! serialize against each other. Within one control, toggles are serialized by
//! disabling it while a round-trip is in flight.

mod edge;
mod graph;
mod list;
mod requests;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use edge::{FollowControl, FollowControlView, FollowState, SocialEdge, ToggleOutcome};
pub use graph::SocialGraph;
pub use list::{FollowList, ListKind, ListedUser};
pub use requests::{IncomingRequests, PendingRequestMonitor, RefreshSignal};
