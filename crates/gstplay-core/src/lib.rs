//! gstplay Core - Playback logic for the gstplay media player
//!
//! This crate holds everything that does not need GStreamer or a window
//! toolkit:
//! - Source resolution (path or URI into a locator and title)
//! - Pipeline description synthesis for every decode path
//! - The playback session state machine
//! - The collaborator traits implemented by `gstplay-desktop`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         gstplay Core                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │   Resolver   │  │   Pipeline   │  │ PlayerConfig │           │
//! │  │              │  │  Synthesizer │  │              │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │   Session   │                              │
//! │                    │ Controller  │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐            │
//! │  │    Media     │  │     Gui     │  │   Reactor    │            │
//! │  │  Framework   │  │             │  │              │            │
//! │  └──────────────┘  └─────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod framework;
pub mod pipeline;
pub mod resolve;
pub mod session;
pub mod types;

pub use config::PlayerConfig;
pub use error::{Error, Result};
pub use framework::{EventSink, Gui, MediaFramework, NoGui, Reactor, SessionEvent, WindowSpec};
pub use pipeline::{synthesize, PipelineDescription, SynthesisOptions};
pub use resolve::{Locator, ResolvedSource, Resolver};
pub use session::SessionController;
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library initialization
pub fn init() {
    tracing::info!(version = VERSION, "gstplay core initialized");
}
