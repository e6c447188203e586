//! End-to-end timing behavior of the events manager.
//!
//! Drives the manager through a virtual clock and scripted input, the way a
//! host loop would, and checks fades, cycling, clicks and blocking waits.
//!
//! Run with: cargo test --test timing

use std::cell::RefCell;
use std::rc::Rc;

use playback_events::resources::{CycleDirection, CycleSlot};
use playback_events::state::cursor::{BLINK_DARK, BLINK_LIT};
use playback_events::*;

// =============================================================================
// HARNESS
// =============================================================================

#[derive(Default)]
struct Recorder {
    frames: u32,
    /// (frame number, first index, color count) of every palette push.
    presented: Vec<(u32, usize, usize)>,
    quit: bool,
}

struct TestEngine(Rc<RefCell<Recorder>>);

impl EngineHooks for TestEngine {
    fn should_quit(&self) -> bool {
        self.0.borrow().quit
    }

    fn on_frame(&mut self) {
        self.0.borrow_mut().frames += 1;
    }

    fn present_palette(&mut self, start: usize, colors: &[u8]) {
        let mut rec = self.0.borrow_mut();
        let frame = rec.frames + 1;
        rec.presented.push((frame, start, colors.len() / 3));
    }

    fn event_record(&self, index: usize) -> Option<EventRecord> {
        (index == 2).then_some(EventRecord {
            hour: 10,
            minute: 5,
            is_am: true,
            kind: EventKind::Video,
        })
    }
}

struct Harness {
    events: EventsManager,
    clock: ManualClock,
    recorder: Rc<RefCell<Recorder>>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(EventsConfig::default())
    }

    fn with_config(config: EventsConfig) -> Self {
        let clock = ManualClock::new();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut events = EventsManager::new(config, clock.clone());
        events.set_engine(Box::new(TestEngine(recorder.clone())));
        events.init_color();
        Self {
            events,
            clock,
            recorder,
        }
    }

    fn with_input(mut self, input: ScriptedInput) -> Self {
        self.events.set_input(Box::new(input));
        self
    }

    /// Advance exactly `frames` frame passes through `poll_events`.
    fn run_frames(&mut self, frames: u32) {
        let target = self.events.frame_count() + frames as u64;
        while self.events.frame_count() < target {
            self.clock.advance(GAME_FRAME_TIME / 2);
            self.events.poll_events();
        }
    }

    fn color(&self, index: usize) -> Rgb {
        Rgb::read(self.events.int_data().palette(), index)
    }
}

fn uniform_map(start: usize, end: usize, steps: u16, color: Rgb) -> CMapResource {
    CMapResource::new(start, end, steps, CMapFlags::UNIFORM, vec![color.r, color.g, color.b])
        .unwrap()
}

fn ramp_palette() -> Vec<u8> {
    (0..PALETTE_SIZE).map(|i| (i / 3) as u8).collect()
}

fn four_rotations() -> CycleResource {
    let slot = |start| {
        Some(CycleSlot::Rotate {
            start,
            end: start + 7,
            rate: 1,
            direction: CycleDirection::Forward,
        })
    };
    CycleResource::new([slot(16), slot(32), slot(48), slot(64)]).unwrap()
}

// =============================================================================
// FADES
// =============================================================================

#[test]
fn test_fade_completes_after_n_fires_then_goes_inert() {
    let mut h = Harness::new();
    let target = Rgb::new(200, 100, 50);
    h.events.start_fade(&uniform_map(0, 3, 4, target));
    assert_eq!(h.events.fade_state(), FadeState::FadingIn);

    h.run_frames(3);
    assert!(h.events.fade_state().is_active());
    h.run_frames(1);
    assert_eq!(h.events.fade_state(), FadeState::Complete);
    for index in 0..=3 {
        assert_eq!(h.color(index), target);
    }

    let pushes = h.recorder.borrow().presented.len();
    let palette = h.events.int_data().palette().to_vec();
    h.run_frames(10);
    assert_eq!(h.events.int_data().palette(), palette.as_slice());
    assert_eq!(h.recorder.borrow().presented.len(), pushes);
}

#[test]
fn test_second_fade_replaces_first() {
    let mut h = Harness::new();
    h.events.start_fade(&uniform_map(0, 0, 4, Rgb::new(200, 200, 200)));
    h.events.start_fade(&uniform_map(0, 0, 2, Rgb::new(40, 40, 40)));
    assert_eq!(h.events.fade().remaining(), 2);

    h.run_frames(1);
    assert_eq!(h.color(0), Rgb::new(20, 20, 20));
    h.run_frames(1);
    assert_eq!(h.events.fade_state(), FadeState::Complete);
    assert_eq!(h.color(0), Rgb::new(40, 40, 40));
    h.run_frames(4);
    assert_eq!(h.color(0), Rgb::new(40, 40, 40));
}

#[test]
fn test_fade_restarted_mid_fade_starts_from_current_colors() {
    let mut h = Harness::new();
    h.events.start_fade(&uniform_map(0, 0, 4, Rgb::new(200, 200, 200)));
    h.run_frames(2);
    assert_eq!(h.color(0), Rgb::new(100, 100, 100));

    h.events.start_fade(&uniform_map(0, 0, 2, Rgb::new(0, 0, 0)));
    assert_eq!(h.events.fade_state(), FadeState::FadingOut);
    h.run_frames(1);
    assert_eq!(h.color(0), Rgb::new(50, 50, 50));
    h.run_frames(1);
    assert_eq!(h.color(0), Rgb::new(0, 0, 0));
    assert_eq!(h.events.fade_state(), FadeState::Complete);
}

#[test]
fn test_fade_pushes_dirty_range_each_step() {
    let mut h = Harness::new();
    h.events.start_fade(&uniform_map(10, 19, 2, Rgb::new(64, 64, 64)));
    h.run_frames(2);
    assert_eq!(h.recorder.borrow().presented, vec![(1, 10, 10), (2, 10, 10)]);
}

#[test]
fn test_zero_step_fade_applies_at_once() {
    let mut h = Harness::new();
    h.events.start_fade(&uniform_map(5, 6, 0, Rgb::new(1, 2, 3)));
    assert_eq!(h.color(5), Rgb::new(1, 2, 3));
    assert_eq!(h.events.fade_state(), FadeState::Complete);
    h.run_frames(1);
    assert_eq!(h.recorder.borrow().presented, vec![(1, 5, 2)]);
}

#[test]
fn test_invalid_fade_is_ignored() {
    let mut h = Harness::new();
    let bad = CMapResource {
        start: 10,
        end: 300,
        steps: 4,
        flags: CMapFlags::empty(),
        entries: Vec::new(),
    };
    h.events.start_fade(&bad);
    assert_eq!(h.events.fade_state(), FadeState::Idle);
    h.run_frames(5);
    assert!(h.recorder.borrow().presented.is_empty());
}

#[test]
fn test_fade_out_from_loaded_palette() {
    let mut h = Harness::new();
    h.events.int_data_mut().set_palette(vec![200; PALETTE_SIZE]);
    h.events.start_fade(&uniform_map(0, 255, 5, Rgb::new(0, 0, 0)));
    assert_eq!(h.events.fade_state(), FadeState::FadingOut);
    h.run_frames(5);
    assert!(h.events.int_data().palette().iter().all(|&c| c == 0));
}

#[test]
fn test_delay_finishes_fade_then_idles() {
    let mut h = Harness::new();
    h.events.start_fade(&uniform_map(0, 0, 3, Rgb::new(90, 90, 90)));

    h.events.delay(5);

    assert_eq!(h.events.fade_state(), FadeState::Complete);
    assert_eq!(h.events.frame_count(), 5);
    assert_eq!(h.events.last_wait_outcome(), WaitOutcome::Elapsed);
    let frames: Vec<u32> = h.recorder.borrow().presented.iter().map(|p| p.0).collect();
    assert_eq!(frames, vec![1, 2, 3]);
}

// =============================================================================
// COLOR CYCLING
// =============================================================================

#[test]
fn test_disabled_cycling_never_touches_palette() {
    let mut h = Harness::new();
    h.events.int_data_mut().set_palette(ramp_palette());
    h.events.start_cycle(four_rotations());
    h.events.set_cycling_enabled(false);

    h.run_frames(200);
    assert_eq!(h.events.int_data().palette(), ramp_palette().as_slice());
}

#[test]
fn test_enabled_cycling_rotates_all_slots() {
    let mut h = Harness::new();
    h.events.int_data_mut().set_palette(ramp_palette());
    h.events.start_cycle(four_rotations());

    h.run_frames(1);
    for start in [16, 32, 48, 64] {
        assert_eq!(h.color(start), Rgb::new(start as u8 + 1, start as u8 + 1, start as u8 + 1));
        assert_eq!(h.color(start + 7), Rgb::new(start as u8, start as u8, start as u8));
    }

    // Eight rotations bring every range back.
    h.run_frames(7);
    assert_eq!(h.events.int_data().palette(), ramp_palette().as_slice());
}

#[test]
fn test_stop_cycle_freezes_palette() {
    let mut h = Harness::new();
    h.events.int_data_mut().set_palette(ramp_palette());
    h.events.start_cycle(four_rotations());
    h.run_frames(3);
    assert!(h.events.stop_cycle().is_some());

    let frozen = h.events.int_data().palette().to_vec();
    h.run_frames(20);
    assert_eq!(h.events.int_data().palette(), frozen.as_slice());
}

#[test]
fn test_fade_does_not_stop_cycling() {
    let mut h = Harness::new();
    h.events.int_data_mut().set_palette(ramp_palette());
    h.events.start_cycle(four_rotations());
    h.events.start_fade(&uniform_map(200, 210, 2, Rgb::new(0, 0, 0)));

    assert!(h.events.node(NodeId::CYCLE).unwrap().is_enabled());
    h.run_frames(1);
    assert_eq!(h.color(16), Rgb::new(17, 17, 17));
}

// =============================================================================
// MOUSE
// =============================================================================

#[test]
fn test_click_edge_flag_reads_once() {
    let mut input = ScriptedInput::new();
    input.push_click(MouseButton::Left, Point::new(30, 40));
    let mut h = Harness::new().with_input(input);

    h.events.poll_events();
    assert!(h.events.new_mouse_clicked());
    assert!(h.events.left_click());
    assert_eq!(h.events.mouse_pos(), Point::new(30, 40));

    h.events.poll_events();
    assert!(!h.events.left_click());
    assert!(h.events.new_mouse_clicked());

    assert!(h.events.take_new_clicks().left);
    h.events.poll_events();
    assert!(!h.events.new_mouse_clicked());
    assert!(!h.events.take_new_clicks().any());
}

#[test]
fn test_get_mouse_info_consumes_clicks() {
    let mut input = ScriptedInput::new();
    input.push(HostEvent::MouseMove(Point::new(3, 3)));
    input.push(HostEvent::ButtonDown(MouseButton::Right, Point::new(5, 6)));
    let mut h = Harness::new().with_input(input);

    let info = h.events.get_mouse_info();
    assert_eq!(info.position, Point::new(5, 6));
    assert!(info.held.right);
    assert!(info.clicked.right);

    let info = h.events.get_mouse_info();
    assert!(info.held.right);
    assert!(!info.clicked.any());
}

#[test]
fn test_reset_mouse_clears_everything() {
    let press = HostEvent::ButtonDown(MouseButton::Left, Point::default());
    let input = ScriptedInput::from_events([press]);
    let mut h = Harness::new().with_input(input);
    h.events.poll_events();
    h.events.reset_mouse();
    assert!(!h.events.mouse_clicked());
    assert!(!h.events.new_mouse_clicked());
}

// =============================================================================
// BLOCKING WAITS
// =============================================================================

#[test]
fn test_delay_click_returns_on_click() {
    let mut input = ScriptedInput::new();
    input.push_click(MouseButton::Left, Point::new(1, 1));
    let mut h = Harness::new().with_input(input);

    let outcome = h.events.delay_click(50);
    assert_eq!(outcome, WaitOutcome::Clicked);
    assert_eq!(h.events.last_wait_outcome(), WaitOutcome::Clicked);
    assert!(h.events.frame_count() < 50);
    assert!(h.events.new_mouse_clicked());
}

#[test]
fn test_delay_click_elapses_without_click() {
    let mut h = Harness::new();
    assert_eq!(h.events.delay_click(7), WaitOutcome::Elapsed);
    assert_eq!(h.events.frame_count(), 7);
}

#[test]
fn test_quit_ends_waits() {
    let input = ScriptedInput::from_events([HostEvent::Quit]);
    let mut h = Harness::new().with_input(input);
    assert_eq!(h.events.delay_click(500), WaitOutcome::Quit);
    assert!(h.events.quit_requested());

    let mut h = Harness::new();
    h.recorder.borrow_mut().quit = true;
    h.events.delay(500);
    assert_eq!(h.events.last_wait_outcome(), WaitOutcome::Quit);
    assert_eq!(h.events.frame_count(), 0);
}

#[test]
fn test_wait_flip_blocks_until_released() {
    let mut h = Harness::new();
    h.events.game_data_mut().request_flip(3);
    h.events.s_wait_flip();
    assert!(!h.events.game_data().flip_wait);
    assert_eq!(h.events.frame_count(), 3);
}

#[test]
fn test_wait_flip_returns_when_no_flip_pending() {
    let mut h = Harness::new();
    h.events.s_wait_flip();
    assert_eq!(h.events.frame_count(), 0);
}

// =============================================================================
// CURSOR
// =============================================================================

#[test]
fn test_cursor_blink_toggles_on_schedule() {
    let config = EventsConfig {
        blink_interval_frames: 4,
        ..EventsConfig::default()
    };
    let mut h = Harness::with_config(config);
    h.events.start_cursor_blink();
    h.events.start_cursor_blink();
    assert!(h.events.is_cursor_blinking());
    assert_eq!(h.color(128), BLINK_LIT);

    h.run_frames(3);
    assert_eq!(h.color(128), BLINK_LIT);
    h.run_frames(1);
    assert_eq!(h.color(128), BLINK_DARK);
    assert!(h.events.cursor().blinked());
    h.run_frames(4);
    assert_eq!(h.color(128), BLINK_LIT);

    h.events.stop_cursor_blink();
    h.run_frames(8);
    assert_eq!(h.color(128), BLINK_LIT);
    assert!(!h.events.is_cursor_blinking());
}

#[test]
fn test_cursor_visibility_and_image() {
    let mut h = Harness::new();
    let visible = h.events.cursor().visible_signal();
    h.events.show_cursor();
    h.events.show_cursor();
    h.events.hide_cursor();
    assert!(!visible.get());
    h.events.show_cursor();
    assert!(h.events.cursor().is_visible());

    let pic = PictureResource::new(8, 4, vec![3; 32]).unwrap();
    h.events.set_cursor(&pic);
    h.events.set_cursor_data(&[1; 4], 2, 2, None);
    let image = h.events.cursor().image().unwrap();
    assert_eq!((image.width, image.height), (2, 2));
}

#[test]
fn test_cursor_color_modes() {
    let mut h = Harness::new();
    h.events.set_cursor_color(200, 3);
    assert_eq!(h.color(200), Rgb::new(90, 232, 232));
    h.events.set_cursor_color(201, 9);
    assert_eq!(h.color(201), Rgb::new(0, 0, 0));
}

// =============================================================================
// EVENT LOG
// =============================================================================

#[test]
fn test_evid_string_format() {
    let h = Harness::new();
    assert_eq!(h.events.evid_string(2).as_deref(), Some("003 10:05 am Video"));
    assert_eq!(h.events.evid_string(0), None);
}
