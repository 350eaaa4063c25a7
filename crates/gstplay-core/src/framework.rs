//! Collaborator interfaces
//!
//! The controller never talks to GStreamer, the window toolkit or the event
//! loop directly. It is written against these traits; `gstplay-desktop`
//! provides the real implementations.

use crate::pipeline::PipelineDescription;
use crate::resolve::Locator;
use crate::types::{Dimensions, StartupPreference};
use crate::Result;
use std::rc::Rc;

/// Asynchronous notifications delivered on the reactor thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The stream reached its end
    EndOfStream,
    /// The framework reported a fatal error
    Error { message: String, details: String },
    /// The user asked the process to stop
    Interrupt,
    /// The playback window was closed
    WindowClosed,
}

/// Callback that feeds [`SessionEvent`]s back into the controller
pub type EventSink = Rc<dyn Fn(SessionEvent)>;

/// The decode/render framework
pub trait MediaFramework {
    /// Build and start a session from `description`. An error means the
    /// description could not be parsed or the session refused to start.
    fn start_session(
        &mut self,
        description: &PipelineDescription,
        startup: StartupPreference,
        events: EventSink,
    ) -> Result<()>;

    /// Tear down the current session
    fn destroy_session(&mut self);

    /// True when there is no session to destroy
    fn has_no_active_session(&self) -> bool;

    /// Natural video size of `locator`, if it can be determined. May block
    /// while a short-lived pipeline prerolls.
    fn probe_source_dimensions(&mut self, locator: &Locator) -> Option<Dimensions>;

    /// Whether colour balance can be applied in software
    fn has_software_color_balance(&self) -> bool;

    /// The description last handed to [`MediaFramework::start_session`],
    /// for diagnostics; empty if none
    fn current_pipeline_description(&self) -> String;
}

/// Parameters for the playback window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub title: String,
    pub size: Dimensions,
    pub fullscreen: bool,
}

/// The window toolkit
pub trait Gui {
    /// False means the process runs in console mode
    fn is_available(&self) -> bool;

    fn create_window(&mut self, spec: &WindowSpec, events: EventSink);

    fn set_window_title(&mut self, title: &str);

    fn show_error_dialog(&mut self, message: &str, details: &str);
}

impl<T: Gui + ?Sized> Gui for Box<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn create_window(&mut self, spec: &WindowSpec, events: EventSink) {
        (**self).create_window(spec, events)
    }

    fn set_window_title(&mut self, title: &str) {
        (**self).set_window_title(title)
    }

    fn show_error_dialog(&mut self, message: &str, details: &str) {
        (**self).show_error_dialog(message, details)
    }
}

/// Stand-in toolkit for console mode
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGui;

impl Gui for NoGui {
    fn is_available(&self) -> bool {
        false
    }

    fn create_window(&mut self, _spec: &WindowSpec, _events: EventSink) {}

    fn set_window_title(&mut self, _title: &str) {}

    fn show_error_dialog(&mut self, _message: &str, _details: &str) {}
}

/// The shared event loop. Running it is the caller's job; the controller
/// only ever asks it to stop.
pub trait Reactor {
    fn quit(&self);
}
