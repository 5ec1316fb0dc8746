#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use layerport_core::{ChannelError, JobId, SubmissionError, UploadResponse};
use layerport_tracker::{
    ChannelEvent, ConversionApi, ConversionTracker, Notice, Notifier, PushChannel,
};

/// Ordered record of calls across the fake API and channel.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub struct FakeApi {
    log: CallLog,
    upload: Mutex<Result<UploadResponse, SubmissionError>>,
    start: Mutex<Result<(), SubmissionError>>,
}

impl FakeApi {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            upload: Mutex::new(Ok(upload_response("abc123", Some("design.pdf")))),
            start: Mutex::new(Ok(())),
        }
    }

    pub fn upload_fails(self, err: SubmissionError) -> Self {
        *self.upload.lock().unwrap() = Err(err);
        self
    }

    pub fn upload_returns(self, response: UploadResponse) -> Self {
        *self.upload.lock().unwrap() = Ok(response);
        self
    }

    pub fn start_fails(self, err: SubmissionError) -> Self {
        *self.start.lock().unwrap() = Err(err);
        self
    }
}

#[async_trait]
impl ConversionApi for FakeApi {
    async fn upload(
        &self,
        file_name: &str,
        _data: Bytes,
    ) -> Result<UploadResponse, SubmissionError> {
        self.log.lock().unwrap().push(format!("upload:{}", file_name));
        self.upload.lock().unwrap().clone()
    }

    async fn start_conversion(&self, job_id: &JobId) -> Result<(), SubmissionError> {
        self.log.lock().unwrap().push(format!("start:{}", job_id));
        self.start.lock().unwrap().clone()
    }
}

pub struct FakeChannel {
    log: CallLog,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    fail_join: bool,
}

impl FakeChannel {
    pub fn new(log: CallLog) -> (Self, mpsc::UnboundedSender<ChannelEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                log,
                events: rx,
                fail_join: false,
            },
            tx,
        )
    }

    pub fn failing_join(mut self) -> Self {
        self.fail_join = true;
        self
    }
}

#[async_trait]
impl PushChannel for FakeChannel {
    async fn join(&mut self, job_id: &JobId) -> Result<(), ChannelError> {
        self.log.lock().unwrap().push(format!("join:{}", job_id));
        if self.fail_join {
            return Err(ChannelError::Closed);
        }
        Ok(())
    }

    fn leave(&mut self, job_id: &JobId) {
        self.log.lock().unwrap().push(format!("leave:{}", job_id));
    }

    async fn recv(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }

    async fn close(&mut self) {
        self.log.lock().unwrap().push("close".to_string());
        self.events.close();
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub fn upload_response(job_id: &str, file_name: Option<&str>) -> UploadResponse {
    UploadResponse {
        job_id: JobId::from(job_id),
        file_name: file_name.map(str::to_string),
        message: Some("File uploaded".to_string()),
    }
}

pub type TestTracker = ConversionTracker<FakeApi, FakeChannel, RecordingNotifier>;

pub struct Harness {
    pub tracker: TestTracker,
    pub events: mpsc::UnboundedSender<ChannelEvent>,
    pub notifier: RecordingNotifier,
    pub log: CallLog,
}

pub fn harness_with(configure: impl FnOnce(FakeApi) -> FakeApi) -> Harness {
    let log: CallLog = Arc::default();
    let api = configure(FakeApi::new(log.clone()));
    let (channel, events) = FakeChannel::new(log.clone());
    let notifier = RecordingNotifier::default();
    let tracker = ConversionTracker::new(api, channel, notifier.clone())
        .with_pricing_url("https://layerport.example/#pricing".to_string());
    Harness {
        tracker,
        events,
        notifier,
        log,
    }
}

pub fn harness() -> Harness {
    harness_with(|api| api)
}
