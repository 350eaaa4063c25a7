//! Player configuration
//!
//! Built once from the command line before the reactor starts and then only
//! read. Nothing here is persisted.

use crate::types::{DecodePath, SinkSelection, StartupPreference};
use serde::{Deserialize, Serialize};

/// Largest accepted window side, in pixels
pub const MAX_WINDOW_SIDE: u32 = 4095;

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Output sinks
    pub sinks: SinkSelection,
    /// Drop audio entirely
    pub video_only: bool,
    /// Let the framework apply volume in software
    pub software_volume: bool,
    /// Let the framework apply colour balance in software
    pub software_color_balance: bool,
    /// End the process when the stream ends
    pub quit_on_stream_end: bool,
    /// Initial session state
    pub startup: StartupPreference,
    /// Decode topology
    pub decode_path: DecodePath,
    /// Requested window width (None = natural video width)
    pub width: Option<u32>,
    /// Requested window height (None = natural video height)
    pub height: Option<u32>,
    /// Full-screen window
    pub fullscreen: bool,
    /// Read the whole source file before playing
    pub preload: bool,
    /// Print informational messages
    pub verbose: bool,
    /// No window toolkit; report on the console
    pub console: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sinks: SinkSelection::default(),
            video_only: false,
            software_volume: true,
            software_color_balance: true,
            quit_on_stream_end: false,
            startup: StartupPreference::Playing,
            decode_path: DecodePath::Playbin,
            width: None,
            height: None,
            fullscreen: false,
            preload: false,
            verbose: false,
            console: false,
        }
    }
}

impl PlayerConfig {
    /// Configuration for running without a window
    pub fn console() -> Self {
        Self {
            console: true,
            quit_on_stream_end: true,
            ..Default::default()
        }
    }

    /// Returns true if `side` is an accepted window width or height
    pub fn is_valid_window_side(side: u32) -> bool {
        (1..=MAX_WINDOW_SIDE).contains(&side)
    }

    /// Whether end of stream should end the session.
    ///
    /// Without a window nothing else could close an ended session.
    pub fn ends_on_stream_end(&self) -> bool {
        self.quit_on_stream_end || self.console
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.sinks.video, "autovideosink");
        assert_eq!(config.sinks.audio, "autoaudiosink");
        assert!(config.software_volume);
        assert!(config.software_color_balance);
        assert_eq!(config.decode_path, DecodePath::Playbin);
        assert!(!config.ends_on_stream_end());
    }

    #[test]
    fn test_console_quits_on_stream_end() {
        let config = PlayerConfig::console();
        assert!(config.console);
        assert!(config.ends_on_stream_end());
    }

    #[test]
    fn test_window_side_bounds() {
        assert!(PlayerConfig::is_valid_window_side(1));
        assert!(PlayerConfig::is_valid_window_side(4095));
        assert!(!PlayerConfig::is_valid_window_side(0));
        assert!(!PlayerConfig::is_valid_window_side(4096));
    }

    #[test]
    fn test_json_dump() {
        let config = PlayerConfig {
            decode_path: DecodePath::H264Qt,
            width: Some(640),
            ..PlayerConfig::console()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["decode_path"], "h264_qt");
        assert_eq!(json["startup"], "playing");
        assert_eq!(json["sinks"]["video"], "autovideosink");
        assert_eq!(json["width"], 640);
        assert!(json["height"].is_null());

        let back: PlayerConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
