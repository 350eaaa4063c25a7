//! Process wiring: builds the collaborators, owns the glib main loop and
//! runs one session to completion

use crate::player::GstPlayer;
use crate::supervisor::{install_fault_handlers, InterruptWatch};
use crate::window::WinitGui;
use anyhow::Result;
use gstplay_core::{
    EventSink, Gui, MediaFramework, NoGui, PlayerConfig, Reactor, SessionController,
    SessionEvent,
};
use gstreamer::glib;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

/// [`Reactor`] backed by a glib main loop.
///
/// A quit requested before [`GlibReactor::run`] is remembered; glib itself
/// drops a quit issued to a loop that is not running.
#[derive(Clone)]
pub struct GlibReactor {
    main_loop: glib::MainLoop,
    quit_requested: Rc<Cell<bool>>,
}

impl GlibReactor {
    /// Loop on the global default context
    pub fn new() -> Self {
        Self::from_loop(glib::MainLoop::new(None, false))
    }

    /// Loop on a private context
    pub fn with_context(context: &glib::MainContext) -> Self {
        Self::from_loop(glib::MainLoop::new(Some(context), false))
    }

    fn from_loop(main_loop: glib::MainLoop) -> Self {
        Self {
            main_loop,
            quit_requested: Rc::new(Cell::new(false)),
        }
    }

    /// Block until [`Reactor::quit`] is called. Returns at once if it
    /// already was.
    pub fn run(&self) {
        if self.quit_requested.get() {
            debug!("Quit requested before the main loop started");
            return;
        }
        self.main_loop.run();
    }
}

impl Default for GlibReactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Reactor for GlibReactor {
    fn quit(&self) {
        self.quit_requested.set(true);
        self.main_loop.quit();
    }
}

type Controller<F> = SessionController<F, Box<dyn Gui>, GlibReactor>;

/// Open a window if a display is reachable and console mode was not forced
pub fn detect_gui(player: &GstPlayer, console: bool) -> Box<dyn Gui> {
    if console {
        return Box::new(NoGui);
    }
    match WinitGui::new(player.window_handle()) {
        Ok(gui) => Box::new(gui),
        Err(e) => {
            debug!(error = %e, "Running without a window");
            Box::new(NoGui)
        }
    }
}

/// Feed events into the controller without keeping it alive
fn event_sink<F: MediaFramework + 'static>(controller: Weak<RefCell<Controller<F>>>) -> EventSink {
    Rc::new(move |event: SessionEvent| {
        let Some(controller) = controller.upgrade() else {
            return;
        };
        match controller.try_borrow_mut() {
            Ok(mut controller) => controller.handle_event(event),
            Err(_) => warn!(?event, "Event dropped while the controller is busy"),
        };
    })
}

/// Play `input`, or show an idle window when there is none, and return
/// once the main loop has quit.
///
/// `gui` decides the mode: [`NoGui`] means console mode, where interrupts
/// and faults are supervised.
pub fn run(config: PlayerConfig, player: GstPlayer, gui: Box<dyn Gui>, input: Option<&str>) -> Result<()> {
    let supervise = !gui.is_available();
    run_session(config, player, gui, GlibReactor::new(), supervise, input)
}

/// [`run`] with every collaborator supplied by the caller. `supervise`
/// installs the SIGINT watch and the fault handlers.
pub fn run_session<F: MediaFramework + 'static>(
    config: PlayerConfig,
    framework: F,
    gui: Box<dyn Gui>,
    reactor: GlibReactor,
    supervise: bool,
    input: Option<&str>,
) -> Result<()> {
    let console = !gui.is_available();
    let controller = Rc::new(RefCell::new(SessionController::new(
        config.clone(),
        framework,
        gui,
        reactor.clone(),
    )));
    let events = event_sink(Rc::downgrade(&controller));

    let interrupt = if supervise {
        let watch = InterruptWatch::install(events.clone());
        install_fault_handlers(config.verbose);
        Some(watch)
    } else {
        None
    };

    {
        let mut session = controller.borrow_mut();
        info!(session_id = %session.id(), console, "Player starting");
        match input {
            Some(input) => {
                let state = session.launch(input, events.clone())?;
                debug!(%state, "Launch finished");
            }
            None => session.open_idle_window(events.clone()),
        }
    }

    reactor.run();

    controller.borrow_mut().close()?;
    if let Some(watch) = interrupt {
        debug!(fired = watch.fired(), "Main loop returned");
        watch.remove();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gstplay_core::{
        Dimensions, Error as CoreError, Locator, PipelineDescription, StartupPreference,
    };

    type Log = Rc<RefCell<Vec<String>>>;

    /// Accepts or refuses every description; an accepted session reaches
    /// its end on the first idle iteration of the loop
    struct ScriptedFramework {
        log: Log,
        active: bool,
        refuse: bool,
    }

    impl MediaFramework for ScriptedFramework {
        fn start_session(
            &mut self,
            _description: &PipelineDescription,
            _startup: StartupPreference,
            events: EventSink,
        ) -> gstplay_core::Result<()> {
            if self.refuse {
                self.log.borrow_mut().push("refused".into());
                return Err(CoreError::PipelineStart("no element \"bogus\"".into()));
            }
            self.active = true;
            self.log.borrow_mut().push("start".into());
            glib::idle_add_local_once(move || events(SessionEvent::EndOfStream));
            Ok(())
        }

        fn destroy_session(&mut self) {
            self.active = false;
            self.log.borrow_mut().push("destroy".into());
        }

        fn has_no_active_session(&self) -> bool {
            !self.active
        }

        fn probe_source_dimensions(&mut self, _locator: &Locator) -> Option<Dimensions> {
            None
        }

        fn has_software_color_balance(&self) -> bool {
            true
        }

        fn current_pipeline_description(&self) -> String {
            String::new()
        }
    }

    fn play_in_console(refuse: bool) -> Log {
        let file = tempfile::NamedTempFile::new().unwrap();
        let log: Log = Rc::default();
        let framework = ScriptedFramework {
            log: log.clone(),
            active: false,
            refuse,
        };

        let context = glib::MainContext::new();
        context
            .with_thread_default(|| {
                run_session(
                    PlayerConfig::console(),
                    framework,
                    Box::new(NoGui),
                    GlibReactor::with_context(&context),
                    false,
                    file.path().to_str(),
                )
            })
            .unwrap()
            .unwrap();
        log
    }

    #[test]
    fn test_quit_before_run_returns() {
        let context = glib::MainContext::new();
        let reactor = GlibReactor::with_context(&context);
        reactor.quit();
        reactor.run();
    }

    #[test]
    fn test_quit_from_inside_loop() {
        let context = glib::MainContext::new();
        let reactor = GlibReactor::with_context(&context);
        let quitter = reactor.clone();
        context
            .with_thread_default(|| {
                glib::idle_add_local_once(move || quitter.quit());
                reactor.run();
            })
            .unwrap();
    }

    #[test]
    fn test_refused_start_in_console_returns() {
        assert_eq!(*play_in_console(true).borrow(), vec!["refused"]);
    }

    #[test]
    fn test_stream_end_in_console_destroys_then_returns() {
        assert_eq!(*play_in_console(false).borrow(), vec!["start", "destroy"]);
    }
}
