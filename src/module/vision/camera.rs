//! Camera Functions
//!

use rscam::{Camera, Config};

use crate::module::util::init::SignBridgeProperty;

/// Represents a V4L2 camera configuration and capture functionality.
///
pub struct V4l2Camera {
    cap: Camera,                  // The camera instance for capturing frames.
    property: SignBridgeProperty, // Configuration properties for the camera.
}

impl V4l2Camera {
    /// Opens and starts the V4L2 device given by the configuration.
    ///
    /// A negative `video_idx` selects the first device. Open or start
    /// failures are returned to the caller; a missing camera is a
    /// recoverable condition, not a crash.
    pub fn new(property: SignBridgeProperty) -> Result<Self, Box<dyn std::error::Error>> {
        let idx = property.conf.camera.video_idx.max(0);
        let device = format!("/dev/video{}", idx);
        let mut cap = Camera::new(&device)?;

        // Configure and start the camera with specified settings.
        cap.start(&Config {
            interval: (1, 30), // 30 fps.
            resolution: (
                property.conf.camera.width as u32,
                property.conf.camera.height as u32,
            ),
            format: b"MJPG",
            nbuffers: 1,
            ..Default::default()
        })?;

        Ok(Self { cap, property })
    }

    /// Captures a frame, mirrors it left-right and saves it to the
    /// ephemeral capture path.
    ///
    /// The mirror matches what a signer expects to see of themselves; the
    /// detection models are fed the same mirrored image.
    pub fn take_picture(&self) -> Result<(), Box<dyn std::error::Error>> {
        // Grab a few frames to reduce delay from stale buffers.
        for _ in 0..self.property.conf.camera.grab_times {
            let _ = self.cap.capture();
        }
        let frame = self.cap.capture()?;

        let img = image::load_from_memory(&frame[..])?;
        let mirrored = img.fliph();
        mirrored.save(&self.property.path.img.capture)?;
        Ok(())
    }
}
