//! This module defines the main functionality of SignBridge, a two-way
//! sign language translator: live camera detection of signed words and
//! letters, and text (or transcribed speech) played back as a sign-image
//! slideshow.

pub mod module; // Import the module submodule that contains other modules
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use crate::module::define; // Import the define module that contains constants and types
use crate::module::session::{self, AppCommand, AppEvent};
use crate::module::util::init::resource::init; // Import the resource initialization function

// The main function of SignBridge
pub fn main() {
    // Prepare the resources by initializing the property struct
    let property = init();

    // Initialize the logging system with the data directory and the system name
    init_log(property.path.dir.data.as_str(), define::system::NAME);
    log::info!("Starting SignBridge...");

    // Start the session thread that owns camera, detection and playback
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (evt_tx, evt_rx) = mpsc::channel();
    let session_handler = session::run(property, cmd_rx, evt_tx);

    // Print session events as they arrive
    let printer_handler = thread::spawn(move || {
        for event in evt_rx {
            print_event(&event);
        }
    });

    // Console front end: one command per line
    println!("{}", USAGE);
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        match parse_command(line.trim()) {
            Some(cmd) => {
                let quit = cmd == AppCommand::Quit;
                if cmd_tx.send(cmd).is_err() || quit {
                    break;
                }
            }
            None => println!("{}", USAGE),
        }
    }

    // Quit the session in case stdin closed without an explicit quit
    let _ = cmd_tx.send(AppCommand::Quit);
    let _ = session_handler.join();
    let _ = printer_handler.join();
}

const USAGE: &str = "commands: camera on | camera off | conf <0.05-0.9> | say <text> | play | speech <wav path> | quit";

/// Parse one console line into a session command.
fn parse_command(line: &str) -> Option<AppCommand> {
    match line {
        "camera on" => Some(AppCommand::CameraOn),
        "camera off" => Some(AppCommand::CameraOff),
        "play" => Some(AppCommand::Play),
        "quit" | "exit" => Some(AppCommand::Quit),
        _ => {
            if let Some(v) = line.strip_prefix("conf ") {
                return v.trim().parse::<f32>().ok().map(AppCommand::SetThreshold);
            }
            if let Some(text) = line.strip_prefix("say ") {
                let text = text.trim();
                if !text.is_empty() {
                    return Some(AppCommand::Convert(text.to_string()));
                }
            }
            if let Some(path) = line.strip_prefix("speech ") {
                let path = path.trim();
                if !path.is_empty() {
                    return Some(AppCommand::Speech(PathBuf::from(path)));
                }
            }
            None
        }
    }
}

/// Render one session event on stdout.
fn print_event(event: &AppEvent) {
    let now = chrono::Local::now().format("%H:%M:%S");
    match event {
        AppEvent::Status(msg) => println!("[{}] STATUS: {}", now, msg),
        AppEvent::Detections {
            tier,
            detections,
            latency_ms,
        } => {
            println!(
                "[{}] mode: live_detection ({}), detections: {}, frame latency: {:.1} ms",
                now,
                tier,
                detections.len(),
                latency_ms
            );
            for det in detections {
                println!("  {}", det.summary());
            }
        }
        AppEvent::Frame {
            label,
            position,
            total,
        } => println!("[{}] playback: frame {}/{} {}", now, position, total, label),
        AppEvent::PlaybackFinished => println!("[{}] playback finished", now),
    }
}

/// This function initializes the logger system using the log4rs crate.
///
/// # Arguments
/// * `dir` - A string slice that holds the directory where the log file will be stored
/// * `name` - A string slice that holds the name of the logger and the log file
fn init_log(dir: &str, name: &str) {
    use crate::module::util::path::join;
    use log::LevelFilter;
    use log4rs::append::file::FileAppender;
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            // Set the encoder to a new PatternEncoder with a custom format
            "{h({d} - {l}: {m}{n})}",
        )))
        .build(join(&[
            dir,
            define::path::LOG_DIR,
            &format!("{}.log", name),
        ]))
        .unwrap();

    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder().appender("logfile").build(LevelFilter::Info))
        .unwrap();
    log4rs::init_config(config).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{debug, error, info, warn};
    use std::fs;
    use std::path::Path;

    #[test]
    fn parse_command_test() {
        assert_eq!(parse_command("camera on"), Some(AppCommand::CameraOn));
        assert_eq!(parse_command("camera off"), Some(AppCommand::CameraOff));
        assert_eq!(parse_command("play"), Some(AppCommand::Play));
        assert_eq!(parse_command("quit"), Some(AppCommand::Quit));
        assert_eq!(
            parse_command("conf 0.5"),
            Some(AppCommand::SetThreshold(0.5))
        );
        assert_eq!(
            parse_command("say hello world"),
            Some(AppCommand::Convert("hello world".to_string()))
        );
        assert_eq!(
            parse_command("speech /tmp/audio.wav"),
            Some(AppCommand::Speech(PathBuf::from("/tmp/audio.wav")))
        );
        assert_eq!(parse_command("say "), None);
        assert_eq!(parse_command("conf abc"), None);
        assert_eq!(parse_command("bogus"), None);
    }

    // A simple test case for the init_log function
    #[test]
    fn test_log() {
        // Define a test directory and name
        let dir = "/tmp/signbridgetest/";
        let name = "test_log";

        // Call the init_log function
        init_log(dir, name);

        // Perform some logging
        debug!("Debug Message");
        info!("Info Message");
        warn!("Warning Message");
        error!("Error Message");

        // Read the contents of the log file
        let log_file_path_str = "/tmp/signbridgetest/log/test_log.log";
        let log_file_path = Path::new(log_file_path_str);
        let log_contents = fs::read_to_string(log_file_path).expect("Failed to read log file");

        // Assert that log messages are present in the file
        assert!(!log_contents.contains("Debug Message"));
        assert!(log_contents.contains("Info Message"));
        assert!(log_contents.contains("Warning Message"));
        assert!(log_contents.contains("Error Message"));
    }
}
