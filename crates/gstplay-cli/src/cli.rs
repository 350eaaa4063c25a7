//! Command line surface

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgAction, Parser};
use gstplay_core::config::MAX_WINDOW_SIDE;
use gstplay_core::{DecodePath, PlayerConfig, SinkSelection, StartupPreference};

const DECODE_PATH_HELP: &str = "\
The --mp4avi, --mp4qt, --h264qt and --msmp4avi options replace playbin or
decodebin with a specific decode path, which avoids audio processing
completely when --videoonly is specified. Option names are case-insensitive.";

/// gstplay -- simple media player using GStreamer
#[derive(Parser, Debug)]
#[command(name = "gstplay")]
#[command(version)]
#[command(about = "gstplay -- simple media player using GStreamer", long_about = None)]
#[command(override_usage = "gstplay <options> <filename or uri>")]
#[command(after_help = DECODE_PATH_HELP)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// This help message
    #[allow(dead_code)]
    #[arg(long, visible_alias = "options", action = ArgAction::Help)]
    help: Option<bool>,

    /// Set width of the output window
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_SIDE as i64))]
    pub width: Option<u32>,

    /// Set height of the output window
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_SIDE as i64))]
    pub height: Option<u32>,

    /// Use full-screen output
    #[arg(long)]
    pub fullscreen: bool,

    /// Display video only, drop audio
    #[arg(long)]
    pub videoonly: bool,

    /// Use decodebin instead of playbin
    #[arg(long, overrides_with_all = ["mp4avi", "mp4qt", "h264qt", "msmp4avi"])]
    pub decodebin: bool,

    /// Use the MPEG-4 decode path for .avi files
    #[arg(long, overrides_with_all = ["decodebin", "mp4qt", "h264qt", "msmp4avi"])]
    pub mp4avi: bool,

    /// Use the MPEG-4 decode path for .mp4/.mov files
    #[arg(long, overrides_with_all = ["decodebin", "mp4avi", "h264qt", "msmp4avi"])]
    pub mp4qt: bool,

    /// Use the H.264 decode path for .mov files
    #[arg(long, overrides_with_all = ["decodebin", "mp4avi", "mp4qt", "msmp4avi"])]
    pub h264qt: bool,

    /// Use the MPEG-4 decode path for Microsoft .avi files (avdec_msmpeg4v2)
    #[arg(long, overrides_with_all = ["decodebin", "mp4avi", "mp4qt", "h264qt"])]
    pub msmp4avi: bool,

    /// Read the entire file into the buffer cache before playing
    #[arg(long)]
    pub preload: bool,

    /// Video output sink (for example xvimagesink or ximagesink)
    #[arg(long, value_name = "SINK", default_value = SinkSelection::AUTO_VIDEO)]
    pub videosink: String,

    /// Audio output sink (for example alsasink or jackaudiosink)
    #[arg(long, value_name = "SINK", default_value = SinkSelection::AUTO_AUDIO)]
    pub audiosink: String,

    /// Print messages/info
    #[arg(long)]
    pub verbose: bool,

    /// Quit when the end of the stream is reached
    #[arg(long)]
    pub quit: bool,

    /// Select the fbdev2sink video sink (console mode only)
    #[arg(long, overrides_with = "directfb")]
    pub fbdev2sink: bool,

    /// Select the dfbvideosink video sink (console mode only)
    #[arg(long, overrides_with = "fbdev2sink")]
    pub directfb: bool,

    /// Console mode: no video window, custom sinks from a terminal
    #[arg(long)]
    pub nogui: bool,

    /// Start paused instead of playing
    #[arg(long)]
    pub paused: bool,

    /// Do not let the framework apply volume in software
    #[arg(long)]
    pub no_soft_volume: bool,

    /// Do not let the framework apply colour balance in software
    #[arg(long)]
    pub no_color_balance: bool,

    /// Filename or URI to play
    #[arg(value_name = "FILENAME OR URI")]
    pub input: Option<String>,
}

impl Cli {
    /// Parse `args`, treating option names case-insensitively
    pub fn try_parse_normalized<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::try_parse_from(normalize_args(args))
    }

    /// Option that only works without a window, if one was given
    pub fn console_only_option(&self) -> Option<&'static str> {
        if self.fbdev2sink {
            Some("--fbdev2sink")
        } else if self.directfb {
            Some("--directfb")
        } else {
            None
        }
    }

    pub fn decode_path(&self) -> DecodePath {
        if self.decodebin {
            DecodePath::Decodebin
        } else if self.mp4avi {
            DecodePath::Mp4Avi
        } else if self.mp4qt {
            DecodePath::Mp4Qt
        } else if self.h264qt {
            DecodePath::H264Qt
        } else if self.msmp4avi {
            DecodePath::MsMp4Avi
        } else {
            DecodePath::Playbin
        }
    }

    /// Build the player configuration. `console` is the mode actually in
    /// use, which is also forced by `--nogui`.
    pub fn to_config(&self, console: bool) -> PlayerConfig {
        let video_sink = if self.fbdev2sink {
            "fbdev2sink".to_string()
        } else if self.directfb {
            "dfbvideosink".to_string()
        } else {
            self.videosink.clone()
        };

        PlayerConfig {
            sinks: SinkSelection::new(video_sink, self.audiosink.clone()),
            video_only: self.videoonly,
            software_volume: !self.no_soft_volume,
            software_color_balance: !self.no_color_balance,
            quit_on_stream_end: self.quit || self.nogui,
            startup: if self.paused {
                StartupPreference::Paused
            } else {
                StartupPreference::Playing
            },
            decode_path: self.decode_path(),
            width: self.width,
            height: self.height,
            fullscreen: self.fullscreen,
            preload: self.preload,
            verbose: self.verbose,
            console: console || self.nogui,
        }
    }
}

/// Lowercase option names, leaving values and positionals alone
pub fn normalize_args<I, T>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut options_done = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || options_done || !arg.starts_with("--") {
                return arg;
            }
            if arg == "--" {
                options_done = true;
                return arg;
            }
            match arg.split_once('=') {
                Some((name, value)) => format!("{}={}", name.to_lowercase(), value),
                None => arg.to_lowercase(),
            }
        })
        .collect()
}

/// Message for a parse failure, worded for the user
pub fn describe_error(err: &clap::Error) -> String {
    if err.kind() == ErrorKind::UnknownArgument {
        if let Some(ContextValue::String(arg)) = err.get(ContextKind::InvalidArg) {
            return format!("Unknown option {arg}. Run with --options for a list.");
        }
    }
    err.to_string()
}
