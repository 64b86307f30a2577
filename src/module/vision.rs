//! Processing related to visual information.
//!
use crate::module::util::init::SignBridgeProperty;

pub mod camera;
pub mod detector;
pub mod overlay;

/// Bundles the capture device and the detection sessions.
///
/// The camera is opened on demand and dropped on stop so that the V4L2
/// device handle is released between runs. The detector is built once; a
/// missing model is recoverable and simply leaves live detection
/// unavailable.
pub struct SignVision {
    pub cam: Option<camera::V4l2Camera>,
    pub det: Option<detector::onnx::SignDetector>,
}

/// SignVision's methods.
///
impl SignVision {
    pub fn new(property: &SignBridgeProperty) -> Self {
        let det = match detector::onnx::SignDetector::new(&property.conf.vision) {
            Ok(det) => Some(det),
            Err(e) => {
                log::warn!("Can't initialize detection sessions: {}", e);
                None
            }
        };
        Self { cam: None, det }
    }

    /// Open the capture device. A failure is reported to the caller and
    /// leaves the camera stopped.
    pub fn start_camera(
        &mut self,
        property: &SignBridgeProperty,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.cam.is_none() {
            self.cam = Some(camera::V4l2Camera::new(property.clone())?);
        }
        Ok(())
    }

    /// Release the capture device so a subsequent start reopens it.
    pub fn stop_camera(&mut self) {
        self.cam = None;
    }

    pub fn camera_running(&self) -> bool {
        self.cam.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::util::conf;
    use crate::module::util::path::{SignBridgeDir, SignBridgeImg, SignBridgePath};
    use std::fs;

    fn test_property() -> SignBridgeProperty {
        let base = "/tmp/signbridgetest/vision";
        fs::create_dir_all(base).unwrap();
        let mut conf = conf::toml::load(base).unwrap();
        // No such capture device.
        conf.camera.video_idx = 99;
        SignBridgeProperty {
            path: SignBridgePath {
                dir: SignBridgeDir {
                    data: base.to_string(),
                    tmp: base.to_string(),
                    img: base.to_string(),
                    log: base.to_string(),
                },
                img: SignBridgeImg {
                    capture: format!("{base}/capture.jpg"),
                    display: format!("{base}/display.jpg"),
                },
            },
            conf,
        }
    }

    #[test]
    fn camera_stop_start_cycle_test() {
        let property = test_property();
        let mut vision = SignVision::new(&property);
        // Missing model files leave detection unavailable but the struct
        // usable.
        assert!(vision.det.is_none());
        assert!(!vision.camera_running());

        // A failed open leaves the camera stopped.
        assert!(vision.start_camera(&property).is_err());
        assert!(!vision.camera_running());

        // Stop releases the handle; a later start takes the reopen path
        // instead of reusing one.
        vision.stop_camera();
        assert!(vision.cam.is_none());
        assert!(!vision.camera_running());
        assert!(vision.start_camera(&property).is_err());
        assert!(!vision.camera_running());
    }
}
