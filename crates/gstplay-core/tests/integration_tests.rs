//! Integration tests for gstplay Core

use gstplay_core::pipeline::{playbin_flags, BranchRole};
use gstplay_core::resolve::locate;
use gstplay_core::{
    synthesize, DecodePath, Dimensions, Error, EventSink, Gui, Locator, MediaFramework,
    PipelineDescription, PlayFlags, PlayerConfig, Reactor, Resolver, SessionController,
    SessionEvent, SessionState, SinkSelection, StartupPreference, SynthesisOptions, WindowSpec,
};
use std::cell::RefCell;
use std::fs::File;
use std::path::Path;
use std::rc::Rc;

const ALL_PATHS: [DecodePath; 6] = [
    DecodePath::Playbin,
    DecodePath::Decodebin,
    DecodePath::Mp4Avi,
    DecodePath::Mp4Qt,
    DecodePath::H264Qt,
    DecodePath::MsMp4Avi,
];

fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

// =============================================================================
// Synthesizer Tests
// =============================================================================

#[test]
fn test_sink_names_appear_once() {
    let source = locate("/media/in.mkv", Path::new("/")).unwrap();
    let sink_pairs = [
        SinkSelection::default(),
        SinkSelection::new("xvimagesink", "alsasink"),
        SinkSelection::new("ximagesink", "pulsesink"),
        // Video-only playbin leaves audio-sink unset rather than naming
        // fakesink a second time
        SinkSelection::new(SinkSelection::NULL, SinkSelection::AUTO_AUDIO),
    ];

    for path in ALL_PATHS {
        for sinks in &sink_pairs {
            for video_only in [false, true] {
                for supported in [false, true] {
                    let config = PlayerConfig {
                        decode_path: path,
                        sinks: sinks.clone(),
                        video_only,
                        ..Default::default()
                    };
                    let options = SynthesisOptions {
                        software_color_balance_supported: supported,
                    };
                    let text = synthesize(&source, &config, options).to_string();

                    assert!(!text.is_empty());
                    assert_eq!(occurrences(&text, &sinks.video), 1, "{path}: {text}");
                    if video_only {
                        assert_eq!(occurrences(&text, &sinks.audio), 0, "{path}: {text}");
                    } else {
                        assert_eq!(occurrences(&text, &sinks.audio), 1, "{path}: {text}");
                    }
                }
            }
        }
    }
}

#[test]
fn test_video_only_empties_audio_branch() {
    let source = locate("/media/in.avi", Path::new("/")).unwrap();
    for path in ALL_PATHS.into_iter().filter(|p| *p != DecodePath::Playbin) {
        let config = PlayerConfig {
            decode_path: path,
            video_only: true,
            ..Default::default()
        };
        let description = synthesize(&source, &config, SynthesisOptions::default());
        assert_eq!(description.branch_text(BranchRole::Audio), Some(String::new()));
    }
}

#[test]
fn test_playbin_flag_properties() {
    for video_only in [false, true] {
        for software_volume in [false, true] {
            for software_color_balance in [false, true] {
                let config = PlayerConfig {
                    video_only,
                    software_volume,
                    software_color_balance,
                    ..Default::default()
                };
                let unsupported = playbin_flags(&config, SynthesisOptions::default());
                assert!(!unsupported.contains(PlayFlags::SOFT_COLORBALANCE));

                let flags = playbin_flags(
                    &config,
                    SynthesisOptions {
                        software_color_balance_supported: true,
                    },
                );
                assert!(flags.contains(PlayFlags::VIDEO | PlayFlags::TEXT | PlayFlags::DEINTERLACE));
                if video_only {
                    assert!(!flags.contains(PlayFlags::AUDIO));
                }
                if !software_volume || video_only {
                    assert!(!flags.contains(PlayFlags::SOFT_VOLUME));
                }
                assert_eq!(
                    flags.contains(PlayFlags::SOFT_COLORBALANCE),
                    software_color_balance
                );
            }
        }
    }
}

// =============================================================================
// Resolver Tests
// =============================================================================

#[test]
fn test_local_inputs_get_file_scheme() {
    for input in ["movie.mp4", "sub/dir/clip.avi", "/abs/path.ogg", "with space.mkv"] {
        let resolved = locate(input, Path::new("/home/user")).unwrap();
        assert!(resolved.locator.as_str().starts_with("file://"), "{input}");
        assert_eq!(resolved.title, input);
    }
}

#[test]
fn test_uri_inputs_are_verbatim() {
    for input in ["http://host/a.mp4", "rtsp://cam/live", "file:///tmp/x.avi", "dvd://1"] {
        let resolved = locate(input, Path::new("/home/user")).unwrap();
        assert_eq!(resolved.locator.as_str(), input);
        assert_eq!(resolved.title, input);
    }
}

// =============================================================================
// Session Controller Tests
// =============================================================================

type Log = Rc<RefCell<Vec<String>>>;

struct RecordingFramework {
    log: Log,
    active: bool,
    refuse: bool,
    last: String,
}

impl MediaFramework for RecordingFramework {
    fn start_session(
        &mut self,
        description: &PipelineDescription,
        startup: StartupPreference,
        _events: EventSink,
    ) -> gstplay_core::Result<()> {
        self.last = description.to_string();
        if self.refuse {
            return Err(Error::PipelineStart("no element \"bogus\"".into()));
        }
        self.active = true;
        self.log.borrow_mut().push(format!("start:{startup:?}"));
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
        self.log.borrow_mut().push("probe".into());
        None
    }

    fn has_software_color_balance(&self) -> bool {
        false
    }

    fn current_pipeline_description(&self) -> String {
        self.last.clone()
    }
}

struct RecordingGui {
    log: Log,
    windows: Rc<RefCell<Vec<WindowSpec>>>,
}

impl Gui for RecordingGui {
    fn is_available(&self) -> bool {
        true
    }

    fn create_window(&mut self, spec: &WindowSpec, _events: EventSink) {
        self.log.borrow_mut().push("window".into());
        self.windows.borrow_mut().push(spec.clone());
    }

    fn set_window_title(&mut self, title: &str) {
        self.log.borrow_mut().push(format!("title:{title}"));
    }

    fn show_error_dialog(&mut self, message: &str, details: &str) {
        self.log.borrow_mut().push(format!("dialog:{message}|{details}"));
    }
}

struct RecordingReactor(Log);

impl Reactor for RecordingReactor {
    fn quit(&self) {
        self.0.borrow_mut().push("quit".into());
    }
}

fn gui_controller(
    config: PlayerConfig,
) -> (
    SessionController<RecordingFramework, RecordingGui, RecordingReactor>,
    Log,
    Rc<RefCell<Vec<WindowSpec>>>,
) {
    controller_with(config, false)
}

fn controller_with(
    config: PlayerConfig,
    refuse: bool,
) -> (
    SessionController<RecordingFramework, RecordingGui, RecordingReactor>,
    Log,
    Rc<RefCell<Vec<WindowSpec>>>,
) {
    let log: Log = Rc::default();
    let windows = Rc::default();
    let framework = RecordingFramework {
        log: log.clone(),
        active: false,
        refuse,
        last: String::new(),
    };
    let gui = RecordingGui {
        log: log.clone(),
        windows: Rc::clone(&windows),
    };
    let controller = SessionController::new(config, framework, gui, RecordingReactor(log.clone()));
    (controller, log, windows)
}

fn no_events() -> EventSink {
    Rc::new(|_| {})
}

#[test]
fn test_gui_launch_probes_before_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.avi");
    File::create(&path).unwrap();

    let config = PlayerConfig {
        width: Some(800),
        startup: StartupPreference::Paused,
        ..Default::default()
    };
    let (mut controller, log, windows) = gui_controller(config);
    let state = controller
        .launch(path.to_str().unwrap(), no_events())
        .unwrap();

    assert_eq!(state, SessionState::Running);
    let title = format!("title:gstplay {}", path.display());
    assert_eq!(
        *log.borrow(),
        vec!["probe", "window", title.as_str(), "start:Paused"]
    );
    assert_eq!(windows.borrow()[0].size, Dimensions::new(800, 576));
}

#[test]
fn test_gui_errors_go_to_dialog() {
    let (mut controller, log, _) = gui_controller(PlayerConfig::default());
    controller.handle_event(SessionEvent::Error {
        message: "Resource not found.".into(),
        details: "gstfilesrc.c".into(),
    });
    assert_eq!(*log.borrow(), vec!["dialog:Resource not found.|gstfilesrc.c"]);
}

#[test]
fn test_refused_start_shows_reason_in_dialog() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.mp4");
    File::create(&path).unwrap();

    let (mut controller, log, _) = controller_with(PlayerConfig::default(), true);
    let state = controller.launch(path.to_str().unwrap(), no_events()).unwrap();

    assert_eq!(state, SessionState::Terminating);
    let dialog = log.borrow().last().cloned().unwrap();
    assert_eq!(dialog, "dialog:Pipeline parse problem.|no element \"bogus\"");
}

#[test]
fn test_window_close_destroys_then_quits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.mp4");
    File::create(&path).unwrap();

    let (mut controller, log, _) = gui_controller(PlayerConfig::default());
    controller.launch(path.to_str().unwrap(), no_events()).unwrap();
    log.borrow_mut().clear();

    controller.handle_event(SessionEvent::WindowClosed);
    controller.handle_event(SessionEvent::WindowClosed);
    assert_eq!(*log.borrow(), vec!["destroy", "quit", "quit"]);

    controller.close().unwrap();
    assert!(controller.state().is_terminal());
}

#[test]
fn test_idle_window_uses_default_size() {
    let config = PlayerConfig {
        height: Some(300),
        ..Default::default()
    };
    let (mut controller, _, windows) = gui_controller(config);
    controller.open_idle_window(no_events());

    let spec = &windows.borrow()[0];
    assert_eq!(spec.size, Dimensions::new(1024, 300));
    assert!(spec.title.is_empty());
    assert_eq!(controller.state(), SessionState::Idle);
}

#[test]
fn test_destroy_without_session_is_noop() {
    let (mut controller, log, _) = gui_controller(PlayerConfig::default());
    controller.destroy_session();
    controller.destroy_session();
    assert!(log.borrow().is_empty());
    controller.close().unwrap();
    assert_eq!(controller.state(), SessionState::Closed);
}

// =============================================================================
// End-to-end Scenarios
// =============================================================================

#[test]
fn test_scenario_default_path() {
    let dir = tempfile::tempdir().unwrap();
    File::create(dir.path().join("movie.mp4")).unwrap();

    let source = Resolver::new(false)
        .with_cwd(dir.path())
        .resolve("movie.mp4")
        .unwrap();
    let expected = format!("file://{}/movie.mp4", dir.path().display());
    assert_eq!(source.locator.as_str(), expected);
    assert_eq!(source.title, "movie.mp4");

    let description = synthesize(&source, &PlayerConfig::default(), SynthesisOptions::default());
    assert!(description.is_playbin());
    assert_eq!(description.elements().count(), 1);
    assert!(description.to_string().contains(&format!("uri={expected}")));
}

#[test]
fn test_scenario_mp4avi_video_only() {
    let dir = tempfile::tempdir().unwrap();
    File::create(dir.path().join("clip.avi")).unwrap();

    let source = Resolver::new(false)
        .with_cwd(dir.path())
        .resolve("clip.avi")
        .unwrap();
    let config = PlayerConfig {
        decode_path: DecodePath::Mp4Avi,
        video_only: true,
        ..Default::default()
    };
    let description = synthesize(&source, &config, SynthesisOptions::default());
    let text = description.to_string();

    assert!(description.elements().any(|e| e.name() == Some("demuxer")));
    assert!(text.contains("avdec_mpeg4"));
    assert_eq!(description.branch_text(BranchRole::Audio), Some(String::new()));
    assert!(!text.contains(SinkSelection::AUTO_AUDIO));
}

#[test]
fn test_missing_input_exit_codes() {
    assert_eq!(Error::NoInput.exit_code(), 0);

    let err = Resolver::new(true)
        .with_cwd("/")
        .resolve("/definitely/not/here.avi")
        .unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert_eq!(err.error_code(), "SOURCE_UNREADABLE");
}
