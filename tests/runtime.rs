use magnifier::lens::geometry::{ScreenPoint, ScreenRect};
use magnifier::lens::input::{KeyCode, KeyEvent, MouseEvent};
use magnifier::lens::messages::MagnifierEvent;
use magnifier::lens::runtime::MagnifierRuntime;
use magnifier::lens::state::Lifecycle;
use magnifier::settings::Settings;
use std::ops::ControlFlow;
use std::time::Duration;

use mock_backend::{Call, RecordingBackend};

fn runtime_with(backend: RecordingBackend) -> MagnifierRuntime<RecordingBackend> {
    MagnifierRuntime::new(backend, &Settings::default())
}

fn started() -> MagnifierRuntime<RecordingBackend> {
    let mut runtime = runtime_with(RecordingBackend::new());
    runtime.start().unwrap();
    runtime
}

fn key(runtime: &mut MagnifierRuntime<RecordingBackend>, event: KeyEvent) -> ControlFlow<i32> {
    runtime.handle_event(MagnifierEvent::Key(event))
}

#[test]
fn startup_order_is_capability_window_layout_show_tick() {
    let runtime = started();
    let calls = &runtime.backend().calls;

    assert_eq!(calls[0], Call::Initialize);
    assert_eq!(calls[1], Call::Create(ScreenRect::new(0, 0, 270, 270)));
    assert_eq!(calls[2], Call::ZoomTransform(2.0));
    assert_eq!(
        calls[calls.len() - 2..],
        [Call::Show, Call::StartTick(Duration::from_millis(16))]
    );
    assert!(calls.contains(&Call::SourceRegion(ScreenRect::new(68, 68, 135, 135))));
    assert_eq!(runtime.lifecycle(), Lifecycle::Running);
}

#[test]
fn failed_initialize_creates_no_window() {
    let mut backend = RecordingBackend::new();
    backend.fail_init = true;
    let mut runtime = runtime_with(backend);

    let err = runtime.start().unwrap_err();
    assert!(format!("{err:#}").contains("magnification capability"));
    assert_eq!(runtime.backend().calls, vec![Call::Initialize]);
    assert_eq!(runtime.lifecycle(), Lifecycle::Stopped);
}

#[test]
fn failed_window_creation_releases_capability() {
    let mut backend = RecordingBackend::new();
    backend.fail_create = true;
    let mut runtime = runtime_with(backend);

    assert!(runtime.start().is_err());
    let calls = &runtime.backend().calls;
    assert_eq!(calls.last(), Some(&Call::Teardown));
    assert!(!calls.contains(&Call::Destroy));
    assert!(!calls.iter().any(|c| matches!(c, Call::StartTick(_))));
}

#[test]
fn rejected_initial_transform_is_fatal() {
    let mut backend = RecordingBackend::new();
    backend.fail_zoom = true;
    let mut runtime = runtime_with(backend);

    assert!(runtime.start().is_err());
    let calls = &runtime.backend().calls;
    assert!(!calls.iter().any(|c| matches!(c, Call::StartTick(_))));
    assert!(calls.ends_with(&[Call::Destroy, Call::Teardown]));
}

#[test]
fn failed_tick_unwinds_window_and_capability() {
    let mut backend = RecordingBackend::new();
    backend.fail_tick = true;
    let mut runtime = runtime_with(backend);

    assert!(runtime.start().is_err());
    let calls = &runtime.backend().calls;
    assert!(calls.ends_with(&[Call::Destroy, Call::Teardown]));
    assert!(!calls.contains(&Call::StopTick));
}

#[test]
fn tick_stops_before_capability_teardown() {
    let mut runtime = started();
    runtime.shutdown();

    let backend = runtime.backend();
    let stop = backend.position_of(&Call::StopTick).unwrap();
    let destroy = backend.position_of(&Call::Destroy).unwrap();
    let teardown = backend.position_of(&Call::Teardown).unwrap();
    assert!(stop < destroy && destroy < teardown);
    assert_eq!(runtime.lifecycle(), Lifecycle::Stopped);
}

#[test]
fn shutdown_twice_releases_once() {
    let mut runtime = started();
    runtime.shutdown();
    runtime.shutdown();

    let backend = runtime.backend();
    assert_eq!(backend.count(|c| *c == Call::StopTick), 1);
    assert_eq!(backend.count(|c| *c == Call::Teardown), 1);
}

#[test]
fn shutdown_before_start_touches_nothing() {
    let mut runtime = runtime_with(RecordingBackend::new());
    runtime.shutdown();
    assert!(runtime.backend().calls.is_empty());
    assert_eq!(runtime.lifecycle(), Lifecycle::Stopped);
}

#[test]
fn events_outside_running_are_dropped() {
    let mut runtime = runtime_with(RecordingBackend::new());
    assert_eq!(
        key(&mut runtime, KeyEvent::plain(KeyCode::Plus)),
        ControlFlow::Continue(())
    );
    assert_eq!(runtime.state().diameter(), 270);
    assert!(runtime.backend().calls.is_empty());

    runtime.start().unwrap();
    runtime.shutdown();
    let recorded = runtime.backend().calls.len();
    assert_eq!(runtime.tick(Some(ScreenPoint::new(5, 5))), ControlFlow::Continue(()));
    assert_eq!(
        key(&mut runtime, KeyEvent::plain(KeyCode::Escape)),
        ControlFlow::Continue(())
    );
    assert_eq!(runtime.backend().calls.len(), recorded);
}

#[test]
fn escape_and_right_double_click_break_with_zero() {
    let mut runtime = started();
    assert_eq!(
        key(&mut runtime, KeyEvent::plain(KeyCode::Escape)),
        ControlFlow::Break(0)
    );
    assert_eq!(runtime.exit_code(), 0);

    let mut runtime = started();
    assert_eq!(
        runtime.handle_event(MagnifierEvent::Mouse(MouseEvent::RightDoubleClick)),
        ControlFlow::Break(0)
    );
}

#[test]
fn follow_tick_centres_lens_on_cursor() {
    let mut runtime = runtime_with(RecordingBackend::with_screen(1600, 1200));
    runtime.start().unwrap();
    assert_eq!(runtime.state().diameter(), 300);

    key(&mut runtime, KeyEvent::plain(KeyCode::F));
    assert_eq!(runtime.backend().calls.last(), Some(&Call::ClickThrough(true)));

    let before = runtime.backend().calls.len();
    runtime.tick(Some(ScreenPoint::new(800, 600)));
    assert_eq!(
        runtime.backend().calls[before..],
        [
            Call::MoveTo(ScreenPoint::new(650, 450)),
            Call::SourceRegion(ScreenRect::new(725, 525, 150, 150)),
            Call::AssertTopmost,
        ]
    );

    assert_eq!(runtime.backend().window_at, ScreenPoint::new(650, 450));
}

#[test]
fn dropped_follow_move_is_retried_next_tick() {
    let mut backend = RecordingBackend::with_screen(1600, 1200);
    backend.failing_moves = 1;
    let mut runtime = runtime_with(backend);
    runtime.start().unwrap();
    key(&mut runtime, KeyEvent::plain(KeyCode::F));

    runtime.tick(Some(ScreenPoint::new(800, 600)));
    assert_eq!(runtime.backend().window_at, ScreenPoint::new(0, 0));

    for _ in 0..4 {
        runtime.tick(Some(ScreenPoint::new(800, 600)));
    }
    let backend = runtime.backend();
    assert_eq!(backend.window_at, ScreenPoint::new(650, 450));
    assert_eq!(backend.count(|c| matches!(c, Call::MoveTo(_))), 5);
    assert_eq!(
        backend.last_source(),
        Some(ScreenRect::new(725, 525, 150, 150))
    );
    assert_eq!(runtime.lifecycle(), Lifecycle::Running);
}

#[test]
fn tick_without_follow_only_refreshes_source() {
    let mut runtime = started();
    let before = runtime.backend().calls.len();
    runtime.tick(Some(ScreenPoint::new(1000, 1000)));
    assert_eq!(
        runtime.backend().calls[before..],
        [
            Call::SourceRegion(ScreenRect::new(68, 68, 135, 135)),
            Call::AssertTopmost,
        ]
    );
}

#[test]
fn source_failures_do_not_stop_the_lens() {
    let mut backend = RecordingBackend::new();
    backend.fail_source = true;
    let mut runtime = runtime_with(backend);
    runtime.start().unwrap();

    assert_eq!(runtime.tick(None), ControlFlow::Continue(()));
    assert_eq!(
        key(&mut runtime, KeyEvent::shifted(KeyCode::Plus)),
        ControlFlow::Continue(())
    );
    assert_eq!(runtime.state().zoom(), 3.0);
    assert_eq!(runtime.lifecycle(), Lifecycle::Running);
}

#[test]
fn hotkey_minimizes_and_restores() {
    let mut runtime = started();
    runtime.handle_event(MagnifierEvent::Hotkey);
    assert_eq!(runtime.backend().calls.last(), Some(&Call::Minimized(true)));
    runtime.handle_event(MagnifierEvent::Hotkey);
    assert_eq!(runtime.backend().calls.last(), Some(&Call::Minimized(false)));
}

#[test]
fn shrinking_below_minimum_keeps_layout_consistent() {
    let mut runtime = started();
    key(&mut runtime, KeyEvent::plain(KeyCode::Minus));
    assert_eq!(runtime.state().diameter(), 270);
    assert_eq!(
        runtime.backend().calls.last(),
        Some(&Call::RequestRepaint)
    );
    assert_eq!(
        runtime.backend().last_source(),
        Some(ScreenRect::new(68, 68, 135, 135))
    );
}
