//! Window management for desktop player
//!
//! winit owns the native window; its events are pumped from a glib timeout
//! so the glib main loop stays the only reactor.

use crate::player::SharedWindowHandle;
use anyhow::{Context, Result};
use gstplay_core::{EventSink, Gui, SessionEvent, WindowSpec};
use gstreamer::glib;
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowId};

/// Interval between winit event pumps
const PUMP_INTERVAL: Duration = Duration::from_millis(16);

/// Window state driven by winit
struct WindowApp {
    spec: Option<WindowSpec>,
    window: Option<Window>,
    handle: SharedWindowHandle,
    /// Events collected during a pump, delivered once it returns
    pending: Vec<SessionEvent>,
}

impl WindowApp {
    fn open(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(spec) = &self.spec else {
            return;
        };

        let attributes = Window::default_attributes()
            .with_title(&spec.title)
            .with_inner_size(PhysicalSize::new(spec.size.width, spec.size.height))
            .with_fullscreen(spec.fullscreen.then_some(Fullscreen::Borderless(None)));

        match event_loop.create_window(attributes) {
            Ok(window) => {
                match native_handle(&window) {
                    Some(raw) => self.handle.store(raw, Ordering::Release),
                    None => debug!("No embeddable window handle; the sink opens its own"),
                }
                info!(size = %spec.size, fullscreen = spec.fullscreen, "Window created");
                self.window = Some(window);
            }
            Err(e) => error!(error = %e, "Failed to create window"),
        }
    }
}

impl ApplicationHandler for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.open(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.handle.store(0, Ordering::Release);
                self.pending.push(SessionEvent::WindowClosed);
            }
            WindowEvent::Resized(size) => {
                debug!(width = size.width, height = size.height, "Window resized");
            }
            _ => {}
        }
    }
}

/// Event loop plus the handler it drives
struct Pump {
    event_loop: EventLoop<()>,
    app: WindowApp,
    events: Option<EventSink>,
}

impl Pump {
    /// Run one non-blocking pump and return what the window reported
    fn pump(&mut self) -> Vec<SessionEvent> {
        if let PumpStatus::Exit(code) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.app)
        {
            debug!(code, "Window event loop exited");
        }
        std::mem::take(&mut self.app.pending)
    }
}

/// winit implementation of [`Gui`]
pub struct WinitGui {
    pump: Rc<RefCell<Pump>>,
    timer: Option<glib::SourceId>,
}

impl WinitGui {
    /// Connect to the display. Fails when there is none, which means the
    /// player runs in console mode.
    pub fn new(handle: SharedWindowHandle) -> Result<Self> {
        let event_loop = EventLoop::new().context("No display available")?;
        Ok(Self {
            pump: Rc::new(RefCell::new(Pump {
                event_loop,
                app: WindowApp {
                    spec: None,
                    window: None,
                    handle,
                    pending: Vec::new(),
                },
                events: None,
            })),
            timer: None,
        })
    }

    fn start_pumping(&mut self) {
        if self.timer.is_some() {
            return;
        }

        let pump = Rc::clone(&self.pump);
        self.timer = Some(glib::timeout_add_local(PUMP_INTERVAL, move || {
            let (reported, events) = {
                let mut pump = pump.borrow_mut();
                let reported = pump.pump();
                (reported, pump.events.clone())
            };
            if let Some(events) = events {
                for event in reported {
                    events(event);
                }
            }
            glib::ControlFlow::Continue
        }));
    }
}

impl Gui for WinitGui {
    fn is_available(&self) -> bool {
        true
    }

    fn create_window(&mut self, spec: &WindowSpec, events: EventSink) {
        {
            let mut pump = self.pump.borrow_mut();
            pump.app.spec = Some(spec.clone());
            pump.events = Some(events);
            // Deliver `resumed` now so the window exists before the
            // session asks for its handle
            let reported = pump.pump();
            pump.app.pending.extend(reported);
        }
        self.start_pumping();
    }

    fn set_window_title(&mut self, title: &str) {
        let mut pump = self.pump.borrow_mut();
        if let Some(window) = &pump.app.window {
            window.set_title(title);
        }
        if let Some(spec) = &mut pump.app.spec {
            spec.title = title.to_string();
        }
    }

    fn show_error_dialog(&mut self, message: &str, details: &str) {
        error!(%message, %details, "Playback error");
        self.set_window_title(&format!("gstplay: error: {message}"));

        // Modal; the pump must not be borrowed while it is up
        let result = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(message)
            .set_description(details)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
        debug!(?result, "Error dialog dismissed");
    }
}

impl Drop for WinitGui {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.remove();
        }
    }
}

/// Native handle of `window` in the form `VideoOverlay` expects
fn native_handle(window: &Window) -> Option<usize> {
    let handle = match window.window_handle() {
        Ok(handle) => handle.as_raw(),
        Err(e) => {
            warn!(error = %e, "Window handle unavailable");
            return None;
        }
    };

    match handle {
        RawWindowHandle::Xlib(h) => Some(h.window as usize),
        RawWindowHandle::Xcb(h) => Some(h.window.get() as usize),
        RawWindowHandle::Win32(h) => Some(h.hwnd.get() as usize),
        RawWindowHandle::AppKit(h) => Some(h.ns_view.as_ptr() as usize),
        _ => None,
    }
}
