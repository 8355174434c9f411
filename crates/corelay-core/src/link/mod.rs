//! Link primitives: dispatch, correlation, and request/reply bridging.

pub mod bridge;
pub mod correlator;
pub mod dispatcher;
pub mod session;

pub use bridge::RequestBridge;
pub use correlator::{Correlator, ListenerGuard};
pub use dispatcher::Dispatcher;
pub use session::LinkSession;
