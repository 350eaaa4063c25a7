//! Playback Session Controller - owns one playback from input to teardown
//!
//! Coordinates:
//! - Source resolution
//! - Dimension probing and window creation (GUI mode)
//! - Description synthesis and session start
//! - Reaction to stream end, framework errors, interrupts and window close
//! - Teardown ordering: the session is destroyed before the reactor is told
//!   to quit

use crate::{
    config::PlayerConfig,
    framework::{EventSink, Gui, MediaFramework, Reactor, SessionEvent, WindowSpec},
    pipeline::{synthesize, PipelineDescription, SynthesisOptions},
    resolve::{ResolvedSource, Resolver},
    types::{Dimensions, SessionId, SessionState},
    Error, Result,
};
use tracing::{debug, error, info, instrument, warn};

/// Prefix for window titles and console messages
pub const PROGRAM_NAME: &str = "gstplay";

/// Message reported when the framework refuses a description
pub const START_FAILURE_MESSAGE: &str = "Pipeline parse problem.";

/// Playback session controller
pub struct SessionController<F, G, R> {
    /// Unique session ID
    id: SessionId,
    /// Effective configuration, fixed before the reactor starts
    config: PlayerConfig,
    framework: F,
    gui: G,
    reactor: R,
    state: SessionState,
    /// Resolved input, immutable once set
    source: Option<ResolvedSource>,
}

impl<F, G, R> SessionController<F, G, R>
where
    F: MediaFramework,
    G: Gui,
    R: Reactor,
{
    /// Create a controller in the `Idle` state
    pub fn new(config: PlayerConfig, framework: F, gui: G, reactor: R) -> Self {
        Self {
            id: SessionId::new(),
            config,
            framework,
            gui,
            reactor,
            state: SessionState::Idle,
            source: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Locator and title of the current input
    pub fn source(&self) -> Option<&ResolvedSource> {
        self.source.as_ref()
    }

    pub fn framework(&self) -> &F {
        &self.framework
    }

    pub fn gui(&self) -> &G {
        &self.gui
    }

    pub fn reactor(&self) -> &R {
        &self.reactor
    }

    /// Errors go to a dialog only when a window toolkit is in use
    pub fn has_gui(&self) -> bool {
        !self.config.console && self.gui.is_available()
    }

    fn set_state(&mut self, next: SessionState) -> Result<()> {
        let current = self.state;
        if !current.can_transition_to(next) {
            return Err(Error::InvalidStateTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        debug!(session_id = %self.id, from = %current, to = %next, "State transition");
        Ok(())
    }

    /// Move to `Terminating` unless already there or past it
    fn enter_terminating(&mut self) {
        if self.state.can_transition_to(SessionState::Terminating) {
            self.state = SessionState::Terminating;
            debug!(session_id = %self.id, "Terminating");
        }
    }

    /// Resolve `input`, size and open the window, synthesize and start.
    ///
    /// Input errors (unreadable file) are returned and the caller ends the
    /// process. A refused description is reported through the error channel
    /// and leaves the controller in `Terminating`; the returned state tells
    /// which case happened.
    #[instrument(skip(self, events), fields(session_id = %self.id))]
    pub fn launch(&mut self, input: &str, events: EventSink) -> Result<SessionState> {
        self.set_state(SessionState::Resolving)?;
        let source = match Resolver::new(self.config.preload).resolve(input) {
            Ok(source) => source,
            Err(e) => {
                self.enter_terminating();
                return Err(e);
            }
        };
        info!(locator = %source.locator, "Source resolved");

        if self.has_gui() {
            self.set_state(SessionState::DimensionProbe)?;
            let size = self.probe_window_size(&source);
            self.gui.create_window(
                &WindowSpec {
                    title: source.title.clone(),
                    size,
                    fullscreen: self.config.fullscreen,
                },
                events.clone(),
            );
        }

        self.set_state(SessionState::Starting)?;
        let description = self.synthesize(&source);
        info!(pipeline = %description, "Pipeline");
        println!("{PROGRAM_NAME}: Playing {}", source.title);
        self.source = Some(source);

        match self
            .framework
            .start_session(&description, self.config.startup, events)
        {
            Ok(()) => {
                self.set_state(SessionState::Running)?;
                Ok(SessionState::Running)
            }
            Err(e) => {
                warn!(error = %e, "Session did not start");
                self.set_state(SessionState::Terminating)?;
                let details = match e {
                    Error::PipelineStart(reason) => reason,
                    other => other.to_string(),
                };
                self.report_error(START_FAILURE_MESSAGE, &details);
                Ok(SessionState::Terminating)
            }
        }
    }

    /// Window size from the probe, falling back to the default, with the
    /// user's requested sides taking precedence
    fn probe_window_size(&mut self, source: &ResolvedSource) -> Dimensions {
        let probed = self.framework.probe_source_dimensions(&source.locator);
        match probed {
            Some(size) => info!(dimensions = %size, "Video dimensions"),
            None => debug!("Video dimensions unknown, using default window size"),
        }
        probed
            .unwrap_or_default()
            .with_requested(self.config.width, self.config.height)
    }

    /// Build the description and title the window after the source
    fn synthesize(&mut self, source: &ResolvedSource) -> PipelineDescription {
        let options = SynthesisOptions {
            software_color_balance_supported: self.framework.has_software_color_balance(),
        };
        let description = synthesize(source, &self.config, options);
        self.gui
            .set_window_title(&format!("{PROGRAM_NAME} {}", source.title));
        description
    }

    /// GUI mode without input: an empty window that lives until closed
    pub fn open_idle_window(&mut self, events: EventSink) {
        let spec = WindowSpec {
            title: String::new(),
            size: Dimensions::DEFAULT.with_requested(self.config.width, self.config.height),
            fullscreen: self.config.fullscreen,
        };
        self.gui.create_window(&spec, events);
    }

    /// React to an asynchronous trigger
    #[instrument(skip(self), fields(session_id = %self.id, state = %self.state))]
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::EndOfStream => {
                info!("End of stream");
                if self.config.ends_on_stream_end() {
                    self.terminate();
                }
            }
            SessionEvent::Error { message, details } => {
                error!(%message, %details, "Playback error");
                self.enter_terminating();
                self.destroy_session();
                self.report_error(&message, &details);
            }
            SessionEvent::Interrupt => self.interrupt(),
            SessionEvent::WindowClosed => {
                info!("Window closed");
                self.terminate();
            }
        }
    }

    /// Cooperative shutdown requested by the user
    pub fn interrupt(&mut self) {
        println!("{PROGRAM_NAME}: Interrupt.");
        self.terminate();
    }

    /// Destroy the session, then stop the reactor
    pub fn terminate(&mut self) {
        self.enter_terminating();
        self.destroy_session();
        self.reactor.quit();
    }

    /// Destroy the session if one exists; a no-op otherwise
    pub fn destroy_session(&mut self) {
        if self.framework.has_no_active_session() {
            return;
        }
        debug!(session_id = %self.id, "Destroying session");
        self.framework.destroy_session();
    }

    /// Single error reporting site: a dialog in GUI mode, otherwise the
    /// console plus the description, and the reactor is asked to quit
    pub fn report_error(&mut self, message: &str, details: &str) {
        if self.has_gui() {
            self.gui.show_error_dialog(message, details);
            return;
        }

        println!("{PROGRAM_NAME}: error: {message}\nDetails:\n{details}");
        let description = self.framework.current_pipeline_description();
        if !description.is_empty() {
            println!("Pipeline: {description}");
        }
        self.reactor.quit();
    }

    /// Called once the reactor has returned. The controller cannot be used
    /// for another session afterwards.
    pub fn close(&mut self) -> Result<()> {
        self.destroy_session();
        if self.state != SessionState::Idle {
            self.enter_terminating();
        }
        self.set_state(SessionState::Closed)?;
        info!(session_id = %self.id, "Session closed");
        Ok(())
    }
}
