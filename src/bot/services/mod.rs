//! Services that turn inbound chat events into lifecycle operations.

mod contexts;
mod dispatch_loop;
mod router;

pub use contexts::{EvidenceContexts, PendingEvidence};
pub use dispatch_loop::{DispatchLoop, DispatchSummary};
pub use router::{InteractionRouter, RouteOutcome};
