//! Camera capture session
//!
//! The host owns the media stream; this tracks which slot the capture is for,
//! produces the `getUserMedia` constraints, and encodes captured frames.

use checklist_config::{CameraConfig, FacingMode};
use image::RgbaImage;
use serde::Serialize;
use signature::encode_jpeg;
use tracing::{debug, warn};

use crate::error::FormError;
use crate::photos::PhotoSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdealSize {
    pub ideal: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub facing_mode: FacingMode,
    pub width: IdealSize,
    pub height: IdealSize,
}

/// Argument for `navigator.mediaDevices.getUserMedia`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaConstraints {
    pub video: VideoConstraints,
    pub audio: bool,
}

impl MediaConstraints {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            video: VideoConstraints {
                facing_mode: config.facing_mode,
                width: IdealSize {
                    ideal: config.ideal_width,
                },
                height: IdealSize {
                    ideal: config.ideal_height,
                },
            },
            audio: config.audio,
        }
    }

    pub fn to_json(&self) -> Result<String, FormError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraState {
    #[default]
    Idle,
    /// Stream requested, modal not shown yet
    Starting(PhotoSlot),
    /// Stream playing, modal visible
    Streaming(PhotoSlot),
}

#[derive(Debug, Clone, Default)]
pub struct CameraSession {
    config: CameraConfig,
    state: CameraState,
}

impl CameraSession {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            state: CameraState::Idle,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Slot the current session captures into
    pub fn active_slot(&self) -> Option<PhotoSlot> {
        match self.state {
            CameraState::Idle => None,
            CameraState::Starting(slot) | CameraState::Streaming(slot) => Some(slot),
        }
    }

    /// Whether the camera modal is showing
    pub fn is_open(&self) -> bool {
        matches!(self.state, CameraState::Streaming(_))
    }

    /// Begin a session for `slot`; returns the constraints to request
    pub fn start(&mut self, slot: PhotoSlot) -> MediaConstraints {
        debug!("Camera requested for slot {}", slot.key());
        self.state = CameraState::Starting(slot);
        MediaConstraints::from_config(&self.config)
    }

    /// The stream is playing; returns false if no session was starting
    pub fn stream_ready(&mut self) -> bool {
        match self.state {
            CameraState::Starting(slot) => {
                self.state = CameraState::Streaming(slot);
                true
            }
            CameraState::Streaming(_) => true,
            CameraState::Idle => false,
        }
    }

    /// The stream could not be opened
    pub fn stream_failed(&mut self, reason: &str) -> FormError {
        warn!("Error accessing camera: {}", reason);
        self.state = CameraState::Idle;
        FormError::Camera(reason.to_string())
    }

    /// Encode `frame` for the active slot and end the session
    ///
    /// Fails without touching the session when nothing is active or the
    /// frame has no pixels.
    pub fn capture(&mut self, frame: &RgbaImage) -> Result<(PhotoSlot, String), FormError> {
        let slot = self.active_slot().ok_or(FormError::NoActiveCamera)?;
        if frame.width() == 0 || frame.height() == 0 {
            return Err(FormError::EmptyFrame);
        }

        let url = encode_jpeg(frame, self.config.jpeg_quality)?;
        self.stop();
        Ok((slot, url.to_string()))
    }

    pub fn stop(&mut self) {
        if self.state != CameraState::Idle {
            debug!("Camera session stopped");
        }
        self.state = CameraState::Idle;
    }

    /// Escape closes an open session; returns true if it did
    pub fn handle_key(&mut self, key: &str) -> bool {
        if key == "Escape" && self.is_open() {
            self.stop();
            return true;
        }
        false
    }
}
