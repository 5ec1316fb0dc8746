//! Wire frames: `{ "event": "<name>", "data": <payload> }` text messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use layerport_core::{ChannelError, Job, JobId, JobUpdate};

use super::ChannelEvent;

pub const EVENT_PROGRESS: &str = "conversion-progress";
pub const EVENT_COMPLETE: &str = "conversion-complete";
pub const EVENT_JOIN: &str = "join-job";

#[derive(Debug, Deserialize)]
struct InboundFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Serialize)]
struct OutboundFrame<'a, T: Serialize> {
    event: &'a str,
    data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinPayload<'a> {
    job_id: &'a JobId,
}

pub fn join_frame(job_id: &JobId) -> Result<String, ChannelError> {
    serde_json::to_string(&OutboundFrame {
        event: EVENT_JOIN,
        data: JoinPayload { job_id },
    })
    .map_err(|e| ChannelError::Protocol(e.to_string()))
}

/// Parse an inbound text frame. Events this client does not handle yield `Ok(None)`.
pub fn parse_frame(text: &str) -> Result<Option<ChannelEvent>, ChannelError> {
    let frame: InboundFrame =
        serde_json::from_str(text).map_err(|e| ChannelError::Protocol(e.to_string()))?;

    match frame.event.as_str() {
        EVENT_PROGRESS => serde_json::from_value::<JobUpdate>(frame.data)
            .map(|update| Some(ChannelEvent::Progress(update)))
            .map_err(|e| ChannelError::Protocol(format!("{}: {}", EVENT_PROGRESS, e))),
        EVENT_COMPLETE => serde_json::from_value::<Job>(frame.data)
            .map(|job| Some(ChannelEvent::Complete(job)))
            .map_err(|e| ChannelError::Protocol(format!("{}: {}", EVENT_COMPLETE, e))),
        _ => Ok(None),
    }
}
