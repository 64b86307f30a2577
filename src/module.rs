//! This module contains all the sub-modules of the project.

pub mod define; // Definition module: Contains definitions and constants used throughout the project.
pub mod session; // Session module: Runs the command-driven session thread.
pub mod speech; // Speech module: Transcribes recorded audio via a remote service.
pub mod translate; // Translate module: Text to sign-image pipeline.
pub mod util; // Utility module: Provides various utility functions and helpers.
pub mod vision; // Vision module: Handles camera capture and object detection.
