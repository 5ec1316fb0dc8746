//! Push channel carrying per-job progress events.

mod frame;
mod ws;

use async_trait::async_trait;

use layerport_core::{ChannelError, Job, JobId, JobUpdate};

pub use frame::{join_frame, parse_frame, EVENT_COMPLETE, EVENT_JOIN, EVENT_PROGRESS};
pub use ws::WsPushChannel;

/// Something that happened on the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Connected,
    Disconnected { reason: String },
    /// Connection could not be established (including the connect timeout).
    ConnectFailed { reason: String },
    /// Partial update, merged onto the active job.
    Progress(JobUpdate),
    /// Authoritative terminal state, replaces the active job.
    Complete(Job),
}

/// A lifecycle-scoped subscription to the conversion service's push channel.
#[async_trait]
pub trait PushChannel: Send {
    /// Join the room of `job_id`. Returns once membership is established, so
    /// a conversion started afterwards cannot outrun its first events.
    async fn join(&mut self, job_id: &JobId) -> Result<(), ChannelError>;

    /// Stop following `job_id`; its room is no longer re-joined on reconnect.
    fn leave(&mut self, job_id: &JobId);

    /// Next event, or `None` once the channel is closed.
    async fn recv(&mut self) -> Option<ChannelEvent>;

    async fn close(&mut self);
}
