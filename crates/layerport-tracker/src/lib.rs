//! Conversion job tracker.
//!
//! Wires the upload gate, the conversion service client and the push channel
//! into a single-job state machine. The tracker owns its push channel: it is
//! connected when the tracker is built and closed on [`ConversionTracker::shutdown`].

pub mod api;
pub mod channel;
pub mod notify;
pub mod store;
pub mod tracker;

pub use api::{ConversionApi, PdfFile};
pub use channel::{ChannelEvent, PushChannel, WsPushChannel};
pub use notify::{Notice, Notifier, TracingNotifier};
pub use store::JobStore;
pub use tracker::ConversionTracker;
