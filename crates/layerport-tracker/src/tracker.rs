//! The conversion tracker.
//!
//! One tracker follows one conversion at a time:
//!
//! 1. the upload gate checks the selected file locally;
//! 2. the file is uploaded and the returned job becomes the active job;
//! 3. the job's push channel room is joined *before* conversion is started,
//!    so no early progress event is missed;
//! 4. progress events are merged into the active job, the complete event
//!    replaces it;
//! 5. a terminal status (completed family or error) ends the attempt.
//!
//! Every failure ends at this boundary as a [`Notice`]; the returned errors
//! are for the caller's control flow only.

use anyhow::Context;

use layerport_api_client::ApiClient;
use layerport_core::presentation::present;
use layerport_core::{
    validate_candidate, ClientConfig, ErrorMetadata, Job, JobId, JobView, LogLevel,
    StatusFamily, SubmissionError, TrackerError,
};

use crate::api::{ConversionApi, PdfFile};
use crate::channel::{ChannelEvent, PushChannel, WsPushChannel};
use crate::notify::{Notice, Notifier};
use crate::store::JobStore;

pub const UPLOADED_MESSAGE: &str = "File uploaded successfully! Starting conversion...";
pub const COMPLETED_MESSAGE: &str = "Conversion completed! Your PSD file is ready for download.";

pub struct ConversionTracker<A, C, N> {
    api: A,
    channel: C,
    notifier: N,
    store: JobStore,
    is_converting: bool,
    entitlement_message: Option<String>,
    pricing_url: Option<String>,
    /// Room currently followed on the push channel.
    joined: Option<JobId>,
    closed: bool,
}

impl<N: Notifier> ConversionTracker<ApiClient, WsPushChannel, N> {
    /// Build a tracker against the configured service and open its push channel.
    pub fn connect(config: &ClientConfig, notifier: N) -> anyhow::Result<Self> {
        let api = ApiClient::new(config).context("Failed to create API client")?;
        let channel = WsPushChannel::connect(
            &config.push_url,
            config.auth_token.clone(),
            config.connect_timeout,
        );
        Ok(Self::new(api, channel, notifier).with_pricing_url(config.pricing_url.clone()))
    }
}

impl<A, C, N> ConversionTracker<A, C, N>
where
    A: ConversionApi,
    C: PushChannel,
    N: Notifier,
{
    pub fn new(api: A, channel: C, notifier: N) -> Self {
        Self {
            api,
            channel,
            notifier,
            store: JobStore::new(),
            is_converting: false,
            entitlement_message: None,
            pricing_url: None,
            joined: None,
            closed: false,
        }
    }

    pub fn with_pricing_url(mut self, pricing_url: String) -> Self {
        self.pricing_url = Some(pricing_url);
        self
    }

    pub fn job(&self) -> Option<&Job> {
        self.store.get()
    }

    pub fn view(&self) -> Option<JobView> {
        present(self.store.get())
    }

    /// True from submission start until a terminal status, a failed
    /// submission or a reset. New submissions are refused meanwhile.
    pub fn is_converting(&self) -> bool {
        self.is_converting
    }

    /// The upgrade message of the last submission, if it failed on entitlement.
    pub fn entitlement_message(&self) -> Option<&str> {
        self.entitlement_message.as_deref()
    }

    /// Validate, upload and start converting `file`.
    #[tracing::instrument(skip(self, file), fields(file = %file.name, size = file.size))]
    pub async fn submit(&mut self, file: &PdfFile) -> Result<JobId, TrackerError> {
        if self.closed {
            return Err(TrackerError::Channel(layerport_core::ChannelError::Closed));
        }
        if self.is_converting {
            tracing::debug!("Ignoring submission while a conversion is in progress");
            return Err(TrackerError::Busy);
        }

        if let Err(rejection) = validate_candidate(&file.candidate()) {
            tracing::debug!(error = %rejection, "File rejected by upload gate");
            self.notifier.notify(Notice::Error(rejection.user_message()));
            return Err(rejection.into());
        }

        self.is_converting = true;
        self.entitlement_message = None;
        self.store.clear();
        self.leave_room();

        match self.upload_and_start(file).await {
            Ok(job_id) => {
                self.notifier
                    .notify(Notice::Info(UPLOADED_MESSAGE.to_string()));
                Ok(job_id)
            }
            Err(err) => {
                self.store.clear();
                self.leave_room();
                self.is_converting = false;
                self.report_submission_failure(&err);
                Err(err.into())
            }
        }
    }

    async fn upload_and_start(&mut self, file: &PdfFile) -> Result<JobId, SubmissionError> {
        let data = file.read().await?;
        let response = self.api.upload(&file.name, data).await?;

        let mut job = Job::from_upload(&response);
        if job.file_name.is_none() {
            job.file_name = Some(file.name.clone());
        }
        let job_id = job.job_id.clone();
        self.store.set(job);

        // Join before starting so the first progress events are not lost.
        let joined = self.channel.join(&job_id).await;
        self.joined = Some(job_id.clone());
        if let Err(e) = joined {
            tracing::warn!(error = %e, job_id = %job_id, "Failed to join job room");
            self.notifier.notify(Notice::ConnectionError(e.user_message()));
        }

        self.api.start_conversion(&job_id).await?;
        Ok(job_id)
    }

    fn leave_room(&mut self) {
        if let Some(job_id) = self.joined.take() {
            self.channel.leave(&job_id);
        }
    }

    fn report_submission_failure(&mut self, err: &SubmissionError) {
        match err.log_level() {
            LogLevel::Debug => tracing::debug!(error = %err, code = err.error_code(), "Submission failed"),
            LogLevel::Warn => tracing::warn!(error = %err, code = err.error_code(), "Submission failed"),
            LogLevel::Error => tracing::error!(error = %err, code = err.error_code(), "Submission failed"),
        }

        if err.is_entitlement() {
            let message = err.user_message();
            self.entitlement_message = Some(message.clone());
            self.notifier.notify(Notice::UpgradeRequired {
                message,
                pricing_url: self.pricing_url.clone(),
            });
        } else {
            self.notifier.notify(Notice::Error(err.user_message()));
        }
    }

    /// Wait for the next push channel event. `None` after shutdown or once
    /// the channel has ended.
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        if self.closed {
            return None;
        }
        self.channel.recv().await
    }

    /// Apply one push channel event to the tracked state.
    pub fn apply(&mut self, event: ChannelEvent) {
        if self.closed {
            return;
        }

        match event {
            ChannelEvent::Connected => tracing::debug!("Push channel connected"),
            ChannelEvent::Disconnected { reason } => {
                tracing::debug!(reason = %reason, "Push channel disconnected")
            }
            ChannelEvent::ConnectFailed { reason } => {
                tracing::warn!(reason = %reason, "Push channel unavailable");
                self.notifier.notify(Notice::ConnectionError(format!(
                    "Live progress updates are unavailable: {}",
                    reason
                )));
            }
            ChannelEvent::Progress(update) => {
                let was_terminal = self.is_terminal();
                let job_id = update.job_id.clone();
                if !self.store.merge(update) {
                    tracing::debug!(job_id = %job_id, "Ignoring progress for inactive job");
                    return;
                }
                self.after_update(was_terminal);
            }
            ChannelEvent::Complete(job) => {
                if !self.store.accepts(&job.job_id) {
                    tracing::debug!(job_id = %job.job_id, "Ignoring completion for inactive job");
                    return;
                }
                let was_terminal = self.is_terminal();
                self.store.set(job);
                self.after_update(was_terminal);
            }
        }
    }

    fn is_terminal(&self) -> bool {
        self.store.get().map(Job::is_terminal).unwrap_or(false)
    }

    fn after_update(&mut self, was_terminal: bool) {
        let Some(job) = self.store.get() else {
            return;
        };

        tracing::debug!(
            job_id = %job.job_id,
            status = ?job.status.as_ref().map(|s| s.as_str()),
            progress = ?job.progress,
            "Job updated"
        );

        if !job.is_terminal() {
            return;
        }

        self.is_converting = false;
        if was_terminal {
            return;
        }

        match job.family() {
            StatusFamily::Completed => {
                tracing::info!(job_id = %job.job_id, "Conversion completed");
                self.notifier
                    .notify(Notice::Success(COMPLETED_MESSAGE.to_string()));
            }
            StatusFamily::Failed => {
                let reason = job.error.as_deref().unwrap_or("Unknown error");
                tracing::warn!(job_id = %job.job_id, reason = %reason, "Conversion failed");
                self.notifier
                    .notify(Notice::Error(format!("Conversion failed: {}", reason)));
            }
            StatusFamily::InProgress => {}
        }
    }

    /// Forget the active job and allow a new submission.
    pub fn reset(&mut self) {
        self.store.clear();
        self.leave_room();
        self.is_converting = false;
        self.entitlement_message = None;
    }

    /// Close the push channel. No state changes happen afterwards.
    pub async fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.channel.close().await;
    }

    /// Apply events until the active job reaches a terminal status, calling
    /// `on_update` with the derived view after each event. Returns the
    /// terminal job, or `None` if the channel ended first.
    pub async fn track_until_terminal<F>(&mut self, mut on_update: F) -> Option<Job>
    where
        F: FnMut(&JobView),
    {
        while let Some(event) = self.recv().await {
            self.apply(event);
            if let Some(view) = self.view() {
                on_update(&view);
            }
            if self.is_terminal() {
                return self.store.get().cloned();
            }
        }
        None
    }
}
