//! GStreamer playback backend
//!
//! Features:
//! - Sessions built from a textual launch description
//! - Bus messages forwarded to the controller as [`SessionEvent`]s
//! - Video sink embedded into the player window via `VideoOverlay`
//! - Natural video size probed with a short-lived `playbin`

use anyhow::{anyhow, Context, Result};
use gstplay_core::{
    Dimensions, Error as CoreError, EventSink, Locator, MediaFramework, PipelineDescription,
    SessionEvent, StartupPreference,
};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_video as gst_video;
use gstreamer_video::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Longest time the dimension probe waits for preroll
pub const PROBE_TIMEOUT_SECS: u64 = 5;

/// Native window handle shared between the window and the streaming
/// threads; 0 means no window
pub type SharedWindowHandle = Arc<AtomicUsize>;

/// GStreamer implementation of [`MediaFramework`]
pub struct GstPlayer {
    pipeline: Option<gst::Element>,
    bus_watch: Option<gst::bus::BusWatchGuard>,
    description: String,
    window_handle: SharedWindowHandle,
}

impl GstPlayer {
    /// Initialize GStreamer and create a player with no session
    pub fn new() -> Result<Self> {
        gst::init().context("Failed to initialize GStreamer")?;

        let (major, minor, micro, nano) = gst::version();
        debug!("GStreamer {}.{}.{}.{}", major, minor, micro, nano);

        Ok(Self {
            pipeline: None,
            bus_watch: None,
            description: String::new(),
            window_handle: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Handle slot the window fills in once it exists
    pub fn window_handle(&self) -> SharedWindowHandle {
        Arc::clone(&self.window_handle)
    }

    /// Hand the window handle to whichever sink asks for it. Runs on a
    /// streaming thread.
    fn install_overlay_handler(&self, bus: &gst::Bus) {
        let handle = Arc::clone(&self.window_handle);
        bus.set_sync_handler(move |_, msg| {
            if !gst_video::is_video_overlay_prepare_window_handle_message(msg) {
                return gst::BusSyncReply::Pass;
            }

            let raw = handle.load(Ordering::Acquire);
            if raw == 0 {
                return gst::BusSyncReply::Pass;
            }

            match msg
                .src()
                .and_then(|src| src.dynamic_cast_ref::<gst_video::VideoOverlay>())
            {
                Some(overlay) => {
                    // SAFETY: the handle belongs to a window that outlives
                    // the session; the window is dropped after the session
                    // is destroyed.
                    unsafe { overlay.set_window_handle(raw) };
                    gst::BusSyncReply::Drop
                }
                None => gst::BusSyncReply::Pass,
            }
        });
    }

    fn launch(
        &mut self,
        text: &str,
        startup: StartupPreference,
        events: EventSink,
    ) -> Result<()> {
        let pipeline = gst::parse::launch(text)?;
        let bus = pipeline
            .bus()
            .ok_or_else(|| anyhow!("Pipeline has no bus"))?;

        self.install_overlay_handler(&bus);
        let watch = bus.add_watch_local(move |_, msg| {
            forward_message(msg, &events);
            gst::glib::ControlFlow::Continue
        })?;

        let target = match startup {
            StartupPreference::Playing => gst::State::Playing,
            StartupPreference::Paused => gst::State::Paused,
        };
        if let Err(e) = pipeline.set_state(target) {
            bus.unset_sync_handler();
            let _ = pipeline.set_state(gst::State::Null);
            return Err(e.into());
        }

        self.pipeline = Some(pipeline);
        self.bus_watch = Some(watch);
        Ok(())
    }
}

/// Translate a bus message into a controller event
fn forward_message(msg: &gst::Message, events: &EventSink) {
    use gst::MessageView;

    match msg.view() {
        MessageView::Eos(..) => events(SessionEvent::EndOfStream),
        MessageView::Error(err) => {
            let source = err
                .src()
                .map(|s| s.path_string().to_string())
                .unwrap_or_default();
            let details = match err.debug() {
                Some(debug) => format!("{debug}\n{source}"),
                None => source,
            };
            events(SessionEvent::Error {
                message: err.error().to_string(),
                details,
            });
        }
        MessageView::Warning(w) => {
            warn!(warning = %w.error(), "Pipeline warning");
        }
        MessageView::StateChanged(s) => {
            if msg.src().map(|src| src.parent().is_none()).unwrap_or(false) {
                debug!(old = ?s.old(), new = ?s.current(), "Pipeline state changed");
            }
        }
        _ => {}
    }
}

impl MediaFramework for GstPlayer {
    #[instrument(skip_all, fields(playbin = description.is_playbin()))]
    fn start_session(
        &mut self,
        description: &PipelineDescription,
        startup: StartupPreference,
        events: EventSink,
    ) -> gstplay_core::Result<()> {
        let text = description.to_string();
        self.description = text.clone();

        self.launch(&text, startup, events)
            .map_err(|e| CoreError::PipelineStart(e.to_string()))?;
        info!(?startup, "Session started");
        Ok(())
    }

    fn destroy_session(&mut self) {
        let Some(pipeline) = self.pipeline.take() else {
            return;
        };

        self.bus_watch.take();
        if let Some(bus) = pipeline.bus() {
            bus.unset_sync_handler();
        }
        if let Err(e) = pipeline.set_state(gst::State::Null) {
            warn!(error = %e, "Failed to stop pipeline");
        }
        debug!("Session destroyed");
    }

    fn has_no_active_session(&self) -> bool {
        self.pipeline.is_none()
    }

    fn probe_source_dimensions(&mut self, locator: &Locator) -> Option<Dimensions> {
        match probe_dimensions(locator.as_str()) {
            Ok(size) => Some(size),
            Err(e) => {
                debug!(error = %e, "Dimension probe failed");
                None
            }
        }
    }

    fn has_software_color_balance(&self) -> bool {
        gst::ElementFactory::find("videobalance").is_some()
    }

    fn current_pipeline_description(&self) -> String {
        self.description.clone()
    }
}

impl Drop for GstPlayer {
    fn drop(&mut self) {
        self.destroy_session();
    }
}

/// Preroll `uri` into fake sinks and read the negotiated video caps
fn probe_dimensions(uri: &str) -> Result<Dimensions> {
    let fake = |name: &str| {
        gst::ElementFactory::make("fakesink")
            .name(name)
            .build()
            .context("fakesink unavailable")
    };

    let playbin = gst::ElementFactory::make("playbin")
        .name("probe")
        .property("uri", uri)
        .property("video-sink", fake("probe-video")?)
        .property("audio-sink", fake("probe-audio")?)
        .build()
        .context("playbin unavailable")?;

    let result = preroll_and_read_caps(&playbin);
    let _ = playbin.set_state(gst::State::Null);
    result
}

fn preroll_and_read_caps(playbin: &gst::Element) -> Result<Dimensions> {
    use gst::MessageView;

    playbin.set_state(gst::State::Paused)?;
    let bus = playbin.bus().context("Probe pipeline has no bus")?;

    let msg = bus
        .timed_pop_filtered(
            gst::ClockTime::from_seconds(PROBE_TIMEOUT_SECS),
            &[gst::MessageType::AsyncDone, gst::MessageType::Error],
        )
        .context("Timed out waiting for preroll")?;
    if let MessageView::Error(err) = msg.view() {
        return Err(anyhow!("{}", err.error()));
    }

    let pad = playbin
        .emit_by_name::<Option<gst::Pad>>("get-video-pad", &[&0i32])
        .context("Source has no video stream")?;
    let caps = pad.current_caps().context("Video caps not negotiated")?;
    let info = gst_video::VideoInfo::from_caps(&caps)?;

    Ok(Dimensions::new(info.width(), info.height()))
}

/// Check GStreamer installation and the elements each decode path needs
pub fn check_gstreamer_installation() -> Result<GStreamerInfo> {
    gst::init().context("Failed to initialize GStreamer")?;

    let (major, minor, micro, nano) = gst::version();
    let version = format!("{}.{}.{}.{}", major, minor, micro, nano);

    let required_elements = [
        ("playbin", "Default decode path"),
        ("decodebin", "Generic decode path"),
        ("avidemux", "AVI paths"),
        ("qtdemux", "QuickTime paths"),
        ("avdec_mpeg4", "MPEG-4 decoding"),
        ("avdec_h264", "H.264 decoding"),
        ("avdec_msmpeg4v2", "Microsoft MPEG-4 decoding"),
    ];

    let missing = required_elements
        .iter()
        .filter(|(element, _)| gst::ElementFactory::find(element).is_none())
        .map(|(element, desc)| format!("{} ({})", element, desc))
        .collect();

    Ok(GStreamerInfo {
        version,
        missing_elements: missing,
    })
}

/// GStreamer installation information
#[derive(Debug)]
pub struct GStreamerInfo {
    pub version: String,
    pub missing_elements: Vec<String>,
}

impl GStreamerInfo {
    pub fn is_complete(&self) -> bool {
        self.missing_elements.is_empty()
    }
}
