//! gstplay Desktop - GStreamer, window and signal integration
//!
//! Implements the collaborators the core controller is written against:
//! - [`GstPlayer`]: sessions from launch descriptions, bus events, video
//!   overlay embedding and dimension probing
//! - [`WinitGui`]: the playback window, pumped from the glib main loop
//! - [`GlibReactor`]: the main loop itself
//! - [`supervisor`]: SIGINT watch and fault handlers for console mode
//!
//! # Example
//!
//! ```rust,no_run
//! use gstplay_core::PlayerConfig;
//! use gstplay_desktop::{detect_gui, run, GstPlayer};
//!
//! let config = PlayerConfig::default();
//! let player = GstPlayer::new().unwrap();
//! let gui = detect_gui(&player, config.console);
//! run(config, player, gui, Some("movie.mp4")).unwrap();
//! ```

pub mod app;
pub mod player;
pub mod supervisor;
pub mod window;

pub use app::{detect_gui, run, GlibReactor};
pub use player::{check_gstreamer_installation, GStreamerInfo, GstPlayer, SharedWindowHandle};
pub use window::WinitGui;
