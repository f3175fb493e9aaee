// Authors: Robert Lopez

use super::{
    outcome::{FailureCause, UploadOutcome},
    submit::UploadFile,
};
use crate::{error::Error, Uploader};
use async_trait::async_trait;
use std::{
    io::Write,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use tracing::warn;

/// Supplies the file for one upload attempt.
#[async_trait]
pub trait FileSource: Send + Sync {
    async fn select(&self) -> Result<UploadFile, Error>;
}

/// Receives the user facing message of a finished attempt.
pub trait OutputSink: Send + Sync {
    fn write(&self, message: &str);
}

/// Reads the file to upload from a fixed path.
pub struct PathFileSource {
    pub path: PathBuf,
    pub content_type: Option<String>,
}

#[async_trait]
impl FileSource for PathFileSource {
    async fn select(&self) -> Result<UploadFile, Error> {
        let file = UploadFile::from_path(&self.path).await?;

        Ok(match &self.content_type {
            Some(content_type) => file.with_content_type(content_type),
            None => file,
        })
    }
}

/// Prints messages to stdout, one per line.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write(&self, message: &str) {
        let mut stdout = std::io::stdout().lock();

        if let Err(err) = writeln!(stdout, "{}", message) {
            warn!(error = %err, "failed to write upload message");
        }
    }
}

/// Where an upload attempt currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    FetchingCredentials,
    Submitting,
    Done(UploadOutcome),
}

/// Runs upload attempts on demand, one at a time.
///
/// Each `trigger` goes `FetchingCredentials -> Submitting -> Done` and
/// writes the outcome message to the sink. A trigger while an attempt is
/// still running is rejected with `Error::Busy`.
pub struct UploadFlow {
    uploader: Arc<Uploader>,
    file_source: Box<dyn FileSource>,
    output: Box<dyn OutputSink>,
    in_flight: AtomicBool,
    state: Mutex<UploadState>,
}

/// Releases the flow when the attempt ends or is dropped.
///
/// An attempt dropped before `Done` leaves the flow `Idle`.
struct InFlightGuard<'a>(&'a UploadFlow);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !matches!(self.0.state(), UploadState::Done(_)) {
            self.0.set_state(UploadState::Idle);
        }

        self.0.in_flight.store(false, Ordering::Release);
    }
}

impl UploadFlow {
    pub fn new(
        uploader: Arc<Uploader>,
        file_source: Box<dyn FileSource>,
        output: Box<dyn OutputSink>,
    ) -> Self {
        Self {
            uploader,
            file_source,
            output,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(UploadState::Idle),
        }
    }

    pub fn state(&self) -> UploadState {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_state(&self, next: UploadState) {
        match self.state.lock() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    /// Starts one upload attempt and waits for it to finish
    ///
    /// ---
    /// Example Usage:
    /// ```
    ///
    /// let flow: UploadFlow = ...;
    ///
    /// let outcome: UploadOutcome = flow.trigger().await?;
    /// ```
    pub async fn trigger(&self) -> Result<UploadOutcome, Error> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("upload triggered while another attempt is running");

            return Err(Error::Busy);
        }

        let _guard = InFlightGuard(self);

        let outcome = self.run().await;

        if let UploadOutcome::Failure { cause } = &outcome {
            warn!(?cause, "upload failed");
        }

        self.output.write(&outcome.to_string());
        self.set_state(UploadState::Done(outcome.clone()));

        Ok(outcome)
    }

    async fn run(&self) -> UploadOutcome {
        self.set_state(UploadState::FetchingCredentials);

        let file = match self.file_source.select().await {
            Ok(file) => file,
            Err(err) => return UploadOutcome::failure(FailureCause::File(err.to_string())),
        };

        let credentials = match self.uploader.fetch_credentials().await {
            Ok(credentials) => credentials,
            Err(err) => {
                return UploadOutcome::failure(FailureCause::Credentials(err.to_string()))
            }
        };

        self.set_state(UploadState::Submitting);

        self.uploader.submit(&credentials, file).await
    }
}
