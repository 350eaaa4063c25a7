//! Core types for gstplay

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decode topology used to build the pipeline description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePath {
    /// A single `playbin` element does demuxing, decoding and sink selection
    #[default]
    Playbin,
    /// Source, `decodebin`, then explicit sink branches
    Decodebin,
    /// MPEG-4 video in AVI
    Mp4Avi,
    /// MPEG-4 video in QuickTime/MP4
    Mp4Qt,
    /// H.264 video in QuickTime/MP4
    H264Qt,
    /// Microsoft MPEG-4 v2 video in AVI
    MsMp4Avi,
}

impl DecodePath {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Playbin => "playbin",
            Self::Decodebin => "decodebin",
            Self::Mp4Avi => "MPEG-4 in AVI",
            Self::Mp4Qt => "MPEG-4 in QuickTime",
            Self::H264Qt => "H.264 in QuickTime",
            Self::MsMp4Avi => "Microsoft MPEG-4 in AVI",
        }
    }
}

impl std::fmt::Display for DecodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Video and audio output sinks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkSelection {
    pub video: String,
    pub audio: String,
}

impl SinkSelection {
    pub const AUTO_VIDEO: &'static str = "autovideosink";
    pub const AUTO_AUDIO: &'static str = "autoaudiosink";
    /// Unaccelerated X11 sink; needs a `videoconvert` in front of it
    pub const BASIC_IMAGE: &'static str = "ximagesink";
    /// Discards everything it receives
    pub const NULL: &'static str = "fakesink";

    pub fn new(video: impl Into<String>, audio: impl Into<String>) -> Self {
        Self {
            video: video.into(),
            audio: audio.into(),
        }
    }

    /// Returns true when the video sink needs a format conversion stage
    pub fn video_needs_conversion(&self) -> bool {
        self.video.trim() == Self::BASIC_IMAGE
    }
}

impl Default for SinkSelection {
    fn default() -> Self {
        Self::new(Self::AUTO_VIDEO, Self::AUTO_AUDIO)
    }
}

/// `playbin` behaviour flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PlayFlags(u32);

impl PlayFlags {
    pub const VIDEO: PlayFlags = PlayFlags(1 << 0);
    pub const AUDIO: PlayFlags = PlayFlags(1 << 1);
    pub const TEXT: PlayFlags = PlayFlags(1 << 2);
    pub const VIS: PlayFlags = PlayFlags(1 << 3);
    pub const SOFT_VOLUME: PlayFlags = PlayFlags(1 << 4);
    pub const NATIVE_AUDIO: PlayFlags = PlayFlags(1 << 5);
    pub const NATIVE_VIDEO: PlayFlags = PlayFlags(1 << 6);
    pub const DOWNLOAD: PlayFlags = PlayFlags(1 << 7);
    pub const BUFFERING: PlayFlags = PlayFlags(1 << 8);
    pub const DEINTERLACE: PlayFlags = PlayFlags(1 << 9);
    pub const SOFT_COLORBALANCE: PlayFlags = PlayFlags(1 << 10);

    /// Flags every default-path description starts from
    pub const BASE: PlayFlags = PlayFlags(
        Self::VIDEO.0
            | Self::AUDIO.0
            | Self::TEXT.0
            | Self::DEINTERLACE.0
            | Self::SOFT_VOLUME.0
            | Self::SOFT_COLORBALANCE.0,
    );

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, other: PlayFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: PlayFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: PlayFlags) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for PlayFlags {
    type Output = PlayFlags;

    fn bitor(self, rhs: PlayFlags) -> PlayFlags {
        PlayFlags(self.0 | rhs.0)
    }
}

impl std::fmt::Display for PlayFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State the session is put in once the framework accepts the description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupPreference {
    #[default]
    Playing,
    Paused,
}

/// Natural video size, used to size the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Window size used when nothing better is known
    pub const DEFAULT: Dimensions = Dimensions {
        width: 1024,
        height: 576,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Override either side with a requested value
    pub fn with_requested(self, width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            width: width.unwrap_or(self.width),
            height: height.unwrap_or(self.height),
        }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Playback session controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for input
    Idle,
    /// Turning the input into a locator
    Resolving,
    /// Asking the framework for the natural video size (GUI only)
    DimensionProbe,
    /// Synthesizing and handing over the description
    Starting,
    /// The reactor is dispatching framework callbacks
    Running,
    /// Tearing the session down
    Terminating,
    /// The reactor returned; terminal
    Closed,
}

impl SessionState {
    /// Check if transition to new state is valid
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Resolving)
                | (Idle, Terminating)
                | (Resolving, DimensionProbe)
                | (Resolving, Starting)
                | (Resolving, Terminating)
                | (DimensionProbe, Starting)
                | (Starting, Running)
                | (Starting, Terminating)
                | (Running, Terminating)
                | (Idle, Closed)
                | (Terminating, Closed)
        )
    }

    /// Returns true once no further transition is possible
    pub fn is_terminal(&self) -> bool {
        *self == SessionState::Closed
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Resolving => "resolving",
            SessionState::DimensionProbe => "dimension_probe",
            SessionState::Starting => "starting",
            SessionState::Running => "running",
            SessionState::Terminating => "terminating",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}
