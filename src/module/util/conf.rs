//! Config Handler.

use serde::{Deserialize, Serialize};

/// Provides TOML config file handling.
pub mod toml {

    use super::DEFAULT_CONFIG;
    use crate::module::define;
    use std::fs::File;
    use std::io::prelude::*;
    use std::path::Path;

    /// Loads a configuration file from the given directory.
    /// If not found, generates a default config file.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory where the configuration file is located or should be created.
    ///
    pub fn load(dir: &str) -> Result<super::Config, Box<dyn std::error::Error>> {
        // Check if the config file exists
        let path = Path::new(dir).join(define::path::CONF_FILE);
        let exist: bool = path.is_file();

        if !exist {
            // Create the default config if it doesn't exist
            let config: super::Config = toml::from_str(DEFAULT_CONFIG)?;
            let toml_str = toml::to_string(&config)?;
            let mut file = File::create(&path)?;
            file.write_all(toml_str.as_bytes())?;
        }

        // Load the config
        let conf_str: String = std::fs::read_to_string(&path)?;
        let setting: super::Config = toml::from_str(&conf_str)?;
        Ok(setting)
    }

    /// Saves a configuration file to the given directory.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory where the configuration file should be saved.
    /// * `conf` - The configuration data to be saved.
    ///
    pub fn save(dir: &str, conf: super::Config) -> Result<(), Box<dyn std::error::Error>> {
        let toml_str = toml::to_string(&conf)?;
        let path = crate::module::util::path::join(&[dir, define::path::CONF_FILE]);
        let mut file = File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }
}

/// Represents the configuration data structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub system: System,
    pub camera: Camera,
    pub vision: Vision,
    pub detectthreshold: DetectThreshold,
    pub examples: Examples,
    pub playback: Playback,
    pub speech: Speech,
}

/// Represents system-related configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct System {
    pub persistent_dir: String,
    pub ephemeral_dir: String,
    pub lang: String,
}

/// Represents camera-related configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Camera {
    pub video_idx: i8,
    pub grab_times: u8,
    pub width: u16,
    pub height: u16,
    pub target_fps: f32,
}

/// Represents vision-related configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Vision {
    pub words_model: String,
    pub letters_model: String,
    pub words_labels: String,
    pub letters_labels: String,
    pub imgsz: u32,
}

/// Represents detection threshold-related configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DetectThreshold {
    pub words: f32,
    pub letters: f32,
}

/// Represents the example image directories used for Text -> Sign.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Examples {
    pub words_dir: String,
    pub letters_dir: String,
}

/// Represents playback-related configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Playback {
    pub frame_duration_ms: u64,
    pub width: u32,
    pub height: u32,
}

/// Represents speech-transcription configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Speech {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_sec: u64,
}

// Default configuration data in TOML format
const DEFAULT_CONFIG: &str = r#"
[system]
  persistent_dir = '/data/signbridge' # Directory for persistent data
  ephemeral_dir = '/run/user/1000/signbridge' # Directory for ephemeral data
  lang = 'en' # Language setting ('en' for English)

[camera]
  video_idx = -1 # Video index (-1 for default)
  grab_times = 3 # Number of warm-up grabs before each capture
  width = 1280 # Image width
  height = 720 # Image height
  target_fps = 15.0 # Upper bound for the live detection loop

[vision]
  words_model = 'asset/model/signbridge_words_640_640.onnx' # Word sign detection model
  letters_model = 'asset/model/signbridge_letters_640_640.onnx' # Letter sign detection model
  words_labels = 'asset/model/signbridge_words_labels.txt' # Word class names, one per line
  letters_labels = 'asset/model/signbridge_letters_labels.txt' # Letter class names, one per line
  imgsz = 640 # Model input size

[detectthreshold]
  words = 0.35 # Detection threshold for word signs
  letters = 0.35 # Detection threshold for letter signs

[examples]
  words_dir = 'asset/examples/words' # Word sign example images
  letters_dir = 'asset/examples/letters' # Letter sign example images

[playback]
  frame_duration_ms = 900 # Time each sign image stays on screen
  width = 640 # Playback canvas width
  height = 480 # Playback canvas height

[speech]
  endpoint = 'https://api.groq.com/openai/v1/audio/transcriptions' # Transcription endpoint
  api_key = 'YOUR-API-KEY' # Bearer token for the transcription service
  model = 'whisper-large-v3-turbo' # Transcription model name
  timeout_sec = 15 # Request timeout
"#;
