//! Provide Loop for the Session.
//!
//! One background thread owns all mutable session state and is driven by a
//! command channel; results go back over an event channel. Live detection
//! and playback are mutually exclusive: starting a conversion stops the
//! camera, starting the camera discards any running playback.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::module::speech;
use crate::module::translate::playback::{build_frames, FrameScheduler};
use crate::module::translate::resolve::SignResolver;
use crate::module::util::init::SignBridgeProperty;
use crate::module::vision::detector::Detection;
use crate::module::vision::{overlay, SignVision};

// Confidence slider range.
const THRESHOLD_MIN: f32 = 0.05;
const THRESHOLD_MAX: f32 = 0.9;

/// Commands accepted by the session thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    CameraOn,
    CameraOff,
    SetThreshold(f32),
    Convert(String),
    /// Replay the most recent conversion.
    Play,
    Speech(PathBuf),
    Quit,
}

/// Events reported by the session thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Status(String),
    Detections {
        tier: &'static str,
        detections: Vec<Detection>,
        latency_ms: f32,
    },
    Frame {
        label: String,
        position: usize,
        total: usize,
    },
    PlaybackFinished,
}

/// Mutable session state, owned by the session thread.
struct SessionState {
    thresholds: crate::module::util::conf::DetectThreshold,
    playback: Option<FrameScheduler>,
    last_text: Option<String>,
}

/// Start the session thread.
///
pub fn run(
    property: SignBridgeProperty,
    rx: Receiver<AppCommand>,
    tx: Sender<AppEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        // init translation pipeline
        let resolver = SignResolver::from_conf(&property.conf.examples);
        // init vision
        let mut vision = SignVision::new(&property);
        // init state
        let mut state = SessionState {
            thresholds: property.conf.detectthreshold.clone(),
            playback: None,
            last_text: None,
        };
        log::info!("Session thread started");
        loop {
            // Drain pending commands before the next tick.
            loop {
                match rx.try_recv() {
                    Ok(AppCommand::Quit) => {
                        log::info!("Session thread stopping");
                        return;
                    }
                    Ok(cmd) => {
                        handle_command(cmd, &property, &resolver, &mut vision, &mut state, &tx)
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            if vision.camera_running() {
                camera_tick(&property, &vision, &state, &tx);
            } else if state.playback.is_some() {
                playback_tick(&property, &mut state, &tx);
            } else {
                // idle
                thread::sleep(Duration::from_millis(50));
            }
        }
    })
}

/// Handle a single command from the front end.
///
fn handle_command(
    cmd: AppCommand,
    property: &SignBridgeProperty,
    resolver: &SignResolver,
    vision: &mut SignVision,
    state: &mut SessionState,
    tx: &Sender<AppEvent>,
) {
    match cmd {
        AppCommand::CameraOn => {
            if vision.det.is_none() {
                status(tx, "Detection models unavailable; camera not started.");
                return;
            }
            // Live detection replaces any running playback.
            state.playback = None;
            match vision.start_camera(property) {
                Ok(()) => status(tx, "Camera started."),
                Err(e) => {
                    log::warn!("Can't open camera: {}", e);
                    status(tx, &format!("Could not open camera: {}", e));
                }
            }
        }
        AppCommand::CameraOff => {
            vision.stop_camera();
            status(tx, "Camera stopped.");
        }
        AppCommand::SetThreshold(v) => {
            let v = clamp_threshold(v);
            state.thresholds.words = v;
            state.thresholds.letters = v;
            status(tx, &format!("Confidence: {:.2}", v));
        }
        AppCommand::Convert(text) => {
            state.last_text = Some(text.clone());
            start_conversion(&text, property, resolver, vision, state, tx);
        }
        AppCommand::Play => match state.last_text.clone() {
            Some(text) => start_conversion(&text, property, resolver, vision, state, tx),
            None => status(tx, "Nothing to play yet."),
        },
        AppCommand::Speech(wav_path) => {
            status(tx, "Transcribing audio...");
            match speech::transcribe(&property.conf.speech, &wav_path.to_string_lossy()) {
                Ok(text) => {
                    status(tx, &format!("Recognized: {}", text));
                    state.last_text = Some(text.clone());
                    start_conversion(&text, property, resolver, vision, state, tx);
                }
                Err(e) => {
                    log::warn!("Transcription failed: {}", e);
                    status(tx, &e.to_string());
                }
            }
        }
        AppCommand::Quit => unreachable!("Quit is handled by the session loop"),
    }
}

/// Resolve text, compose the frame sequence and start playback, replacing
/// any sequence already running.
fn start_conversion(
    text: &str,
    property: &SignBridgeProperty,
    resolver: &SignResolver,
    vision: &mut SignVision,
    state: &mut SessionState,
    tx: &Sender<AppEvent>,
) {
    // Conversion and live detection are mutually exclusive.
    vision.stop_camera();

    let entries = resolver.resolve(text);
    if entries.is_empty() {
        status(tx, "No signable text found.");
        return;
    }
    let frames = build_frames(&entries, &property.conf.playback);
    let duration = Duration::from_millis(property.conf.playback.frame_duration_ms);
    status(tx, &format!("Playing sign sequence ({} frames)...", frames.len()));
    state.playback = Some(FrameScheduler::new(frames, duration, Instant::now()));
}

/// One live-detection tick: capture, run the two-tier detection, write
/// the annotated frame, report, then sleep off the rest of the frame
/// interval.
fn camera_tick(
    property: &SignBridgeProperty,
    vision: &SignVision,
    state: &SessionState,
    tx: &Sender<AppEvent>,
) {
    let t0 = Instant::now();
    if let (Some(cam), Some(det)) = (&vision.cam, &vision.det) {
        match cam.take_picture() {
            Ok(()) => {
                let report = det.detect(&property.path.img.capture, &state.thresholds);
                if let Err(e) = overlay::render(
                    &property.path.img.capture,
                    &report.detections,
                    property.conf.vision.imgsz,
                    &property.path.img.display,
                ) {
                    log::warn!("Can't write detection overlay: {}", e);
                }
                let latency_ms = t0.elapsed().as_secs_f32() * 1000.0;
                let _ = tx.send(AppEvent::Detections {
                    tier: report.tier.as_str(),
                    detections: report.detections,
                    latency_ms,
                });
            }
            Err(e) => {
                log::warn!("Capture failed: {}", e);
            }
        }
    }

    let target_fps = property.conf.camera.target_fps.max(1.0);
    let interval = Duration::from_secs_f32(1.0 / target_fps);
    let elapsed = t0.elapsed();
    if elapsed < interval {
        thread::sleep(interval - elapsed);
    }
}

/// One playback tick: publish the next frame once it is due.
fn playback_tick(
    property: &SignBridgeProperty,
    state: &mut SessionState,
    tx: &Sender<AppEvent>,
) {
    let Some(sched) = state.playback.as_mut() else {
        return;
    };

    let mut shown: Option<String> = None;
    if let Some(frame) = sched.next_frame(Instant::now()) {
        if let Err(e) = frame.image.save(&property.path.img.display) {
            log::warn!("Can't write display image: {}", e);
        }
        shown = Some(frame.label.clone());
    }
    if let Some(label) = shown {
        let _ = tx.send(AppEvent::Frame {
            label,
            position: sched.position(),
            total: sched.total(),
        });
    }
    if sched.is_finished() {
        state.playback = None;
        let _ = tx.send(AppEvent::PlaybackFinished);
        status(tx, "Idle");
        return;
    }

    thread::sleep(Duration::from_millis(10));
}

fn status(tx: &Sender<AppEvent>, msg: &str) {
    log::info!("STATUS: {}", msg);
    let _ = tx.send(AppEvent::Status(msg.to_string()));
}

fn clamp_threshold(v: f32) -> f32 {
    v.clamp(THRESHOLD_MIN, THRESHOLD_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::util::conf;
    use crate::module::util::path::{SignBridgeDir, SignBridgeImg, SignBridgePath};
    use std::fs;
    use std::sync::mpsc;

    fn test_property(tag: &str) -> SignBridgeProperty {
        let base = format!("/tmp/signbridgetest/session_{tag}");
        fs::create_dir_all(format!("{base}/img")).unwrap();
        fs::create_dir_all(format!("{base}/log")).unwrap();
        let mut conf = conf::toml::load(&base).unwrap();
        // Keep the test fast.
        conf.playback.frame_duration_ms = 20;
        SignBridgeProperty {
            path: SignBridgePath {
                dir: SignBridgeDir {
                    data: base.clone(),
                    tmp: base.clone(),
                    img: format!("{base}/img"),
                    log: format!("{base}/log"),
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
    fn clamp_threshold_test() {
        assert_eq!(clamp_threshold(0.5), 0.5);
        assert_eq!(clamp_threshold(0.0), THRESHOLD_MIN);
        assert_eq!(clamp_threshold(2.0), THRESHOLD_MAX);
    }

    #[test]
    fn conversion_plays_and_finishes_test() {
        let property = test_property("convert");
        let display = property.path.img.display.clone();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        let handle = run(property, cmd_rx, evt_tx);

        // With no example directories every signable char resolves to a
        // pause, but the sequence still plays.
        cmd_tx.send(AppCommand::Convert("hi".to_string())).unwrap();

        let mut labels = vec![];
        let mut finished = false;
        for _ in 0..20 {
            match evt_rx.recv_timeout(Duration::from_secs(2)) {
                Ok(AppEvent::Frame { label, total, .. }) => {
                    assert_eq!(total, 2);
                    labels.push(label);
                }
                Ok(AppEvent::PlaybackFinished) => {
                    finished = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => panic!("event stream stalled: {e}"),
            }
        }
        // Unindexed letters become pauses captioned with the character.
        assert_eq!(labels, vec!["h", "i"]);
        assert!(finished);
        assert!(std::path::Path::new(&display).is_file());

        cmd_tx.send(AppCommand::Quit).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn camera_needs_models_test() {
        let property = test_property("camera");
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        let handle = run(property, cmd_rx, evt_tx);

        // The model files don't exist here, so live detection must be
        // refused with a status message rather than a crash.
        cmd_tx.send(AppCommand::CameraOn).unwrap();

        let mut refused = false;
        for _ in 0..10 {
            match evt_rx.recv_timeout(Duration::from_secs(2)) {
                Ok(AppEvent::Status(msg)) if msg.contains("unavailable") => {
                    refused = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => panic!("event stream stalled: {e}"),
            }
        }
        assert!(refused);

        cmd_tx.send(AppCommand::Quit).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn play_without_conversion_test() {
        let property = test_property("play");
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        let handle = run(property, cmd_rx, evt_tx);

        cmd_tx.send(AppCommand::Play).unwrap();

        let mut rejected = false;
        for _ in 0..10 {
            match evt_rx.recv_timeout(Duration::from_secs(2)) {
                Ok(AppEvent::Status(msg)) if msg.contains("Nothing to play") => {
                    rejected = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => panic!("event stream stalled: {e}"),
            }
        }
        assert!(rejected);

        cmd_tx.send(AppCommand::Quit).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn empty_conversion_is_rejected_test() {
        let property = test_property("empty");
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        let handle = run(property, cmd_rx, evt_tx);

        cmd_tx.send(AppCommand::Convert("   ".to_string())).unwrap();

        let mut rejected = false;
        for _ in 0..10 {
            match evt_rx.recv_timeout(Duration::from_secs(2)) {
                Ok(AppEvent::Status(msg)) if msg.contains("No signable text") => {
                    rejected = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => panic!("event stream stalled: {e}"),
            }
        }
        assert!(rejected);

        cmd_tx.send(AppCommand::Quit).unwrap();
        handle.join().unwrap();
    }
}
