//! Upload widget: the presentational state machine behind the
//! drag-and-drop / file-picker surface.
//!
//! The transport does not expose byte-level progress on every path, so
//! progress is simulated: each `tick` advances it by a configured increment
//! up to a cap (90 by default), and confirmed completion jumps it to 100.
//! Where the transport does report real progress,
//! [`UploadWidget::transport_progress`] overrides the simulation. Ticks are
//! plain method calls so tests never need a real timer; the CLI drives them
//! from a tokio interval.
//!
//! Previews are held as [`PreviewHandle`]s issued by a [`PreviewRegistry`];
//! a handle is released (dropped) when superseded by a newer selection, on
//! error, or on teardown, mirroring the object-URL discipline the browser
//! front-end needs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::upload::UploadResult;

/// Where simulated progress stops until completion is confirmed.
pub const SIMULATED_PROGRESS_CAP: u8 = 90;

/// Ephemeral UI state of one widget instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Dragging,
    Uploading { progress: u8 },
    Success { message: String },
    Error { message: String },
}

/// Tunables for the simulated progress and the auto-revert to Idle.
#[derive(Debug, Clone, Copy)]
pub struct WidgetConfig {
    /// Percent points added per tick while uploading.
    pub tick_increment: u8,
    /// Simulated progress never passes this until completion.
    pub simulated_cap: u8,
    /// Ticks spent in Success/Error before reverting to Idle. With the
    /// CLI's 500 ms tick this lands inside the 3-5 s window.
    pub revert_ticks: u32,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            tick_increment: 10,
            simulated_cap: SIMULATED_PROGRESS_CAP,
            revert_ticks: 8,
        }
    }
}

/// Issues preview handles and counts how many are still live, so tests can
/// assert that superseded previews were actually released.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<AtomicUsize>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, data_url: String) -> PreviewHandle {
        self.live.fetch_add(1, Ordering::SeqCst);
        PreviewHandle {
            data_url,
            live: Arc::clone(&self.live),
        }
    }

    /// Number of handles not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// An owned preview; dropping it releases the underlying resource.
#[derive(Debug)]
pub struct PreviewHandle {
    data_url: String,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// One upload widget instance. A second file selection while an upload is
/// in flight simply restarts the visible progress; the prior request is
/// neither cancelled nor waited for.
pub struct UploadWidget {
    config: WidgetConfig,
    state: UploadState,
    preview: Option<PreviewHandle>,
    /// Image shown before this widget ever uploaded anything (edit mode).
    prior_image_url: Option<String>,
    ticks_in_terminal: u32,
    last_result: Option<UploadResult>,
}

impl UploadWidget {
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            config,
            state: UploadState::Idle,
            preview: None,
            prior_image_url: None,
            ticks_in_terminal: 0,
            last_result: None,
        }
    }

    /// Widget editing an existing publication: `image_url` is restored if
    /// an upload fails.
    pub fn with_existing_image(config: WidgetConfig, image_url: impl Into<String>) -> Self {
        let mut widget = Self::new(config);
        widget.prior_image_url = Some(image_url.into());
        widget
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn last_result(&self) -> Option<&UploadResult> {
        self.last_result.as_ref()
    }

    /// What the image slot currently shows: the live preview if one exists,
    /// otherwise the prior image.
    pub fn displayed_image(&self) -> Option<&str> {
        self.preview
            .as_ref()
            .map(PreviewHandle::data_url)
            .or(self.prior_image_url.as_deref())
    }

    pub fn drag_enter(&mut self) {
        if matches!(self.state, UploadState::Idle | UploadState::Dragging) {
            self.state = UploadState::Dragging;
        }
    }

    pub fn drag_leave(&mut self) {
        if self.state == UploadState::Dragging {
            self.state = UploadState::Idle;
        }
    }

    /// A file was picked or dropped. Replacing the preview releases the
    /// superseded handle.
    pub fn file_selected(&mut self, preview: Option<PreviewHandle>) {
        debug!(has_preview = preview.is_some(), "File selected, starting upload display");
        self.preview = preview;
        self.ticks_in_terminal = 0;
        self.state = UploadState::Uploading { progress: 0 };
    }

    /// One timer tick: advance simulated progress, or age out a terminal
    /// state back to Idle.
    pub fn tick(&mut self) {
        match &mut self.state {
            UploadState::Uploading { progress } => {
                *progress = progress
                    .saturating_add(self.config.tick_increment)
                    .min(self.config.simulated_cap);
            }
            UploadState::Success { .. } | UploadState::Error { .. } => {
                self.ticks_in_terminal += 1;
                if self.ticks_in_terminal >= self.config.revert_ticks {
                    self.ticks_in_terminal = 0;
                    self.state = UploadState::Idle;
                }
            }
            _ => {}
        }
    }

    /// Real progress from the transport, where available. Takes precedence
    /// over the simulation, including past its cap.
    pub fn transport_progress(&mut self, percent: u8) {
        if let UploadState::Uploading { progress } = &mut self.state {
            *progress = percent.min(100);
        }
    }

    /// Confirmed completion: progress jumps to 100, the result becomes the
    /// prior image for any later attempt, and the widget reports success.
    pub fn upload_succeeded(&mut self, result: UploadResult) {
        info!(url = %result.image_url, "Upload confirmed");
        self.state = UploadState::Success {
            message: format!("Uploaded {}", result.original_file_name),
        };
        self.ticks_in_terminal = 0;
        self.prior_image_url = Some(result.image_url.clone());
        self.last_result = Some(result);
    }

    /// Failure: the partial preview is discarded and the prior image (if
    /// editing) shows again.
    pub fn upload_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(message = %message, "Upload failed, discarding preview");
        self.preview = None;
        self.ticks_in_terminal = 0;
        self.state = UploadState::Error { message };
    }

    /// Release the preview when the widget goes away.
    pub fn teardown(&mut self) {
        self.preview = None;
    }
}
