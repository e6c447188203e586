//! Palette Demo - Fades, color cycling and click waits on a real clock
//!
//! Fades a palette range in, runs a rotation cycle while waiting for a
//! click, then fades back out. Every palette push is reported on stdout.
//! Click to skip a wait, Ctrl+C to quit.
//!
//! Run with: RUST_LOG=debug cargo run --example palette_demo

use std::io::{Write, stdout};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use playback_events::input::{CrosstermInput, disable_mouse, enable_mouse};
use playback_events::resources::{CycleDirection, CycleSlot};
use playback_events::*;

/// Prints a one-line summary of every palette push.
struct TerminalEngine {
    seconds: u32,
}

impl EngineHooks for TerminalEngine {
    fn on_clock_second(&mut self) {
        self.seconds += 1;
    }

    fn present_palette(&mut self, start: usize, colors: &[u8]) {
        let first = Rgb::read(colors, 0);
        print!(
            "\r[{:>3}s] palette {:>3}..{:<3} first=({:>3},{:>3},{:>3})   ",
            self.seconds,
            start,
            start + colors.len() / 3 - 1,
            first.r,
            first.g,
            first.b
        );
        let _ = stdout().flush();
    }
}

fn fade_map(color: Rgb, steps: u16) -> Option<CMapResource> {
    CMapResource::new(
        16,
        47,
        steps,
        CMapFlags::UNIFORM,
        vec![color.r, color.g, color.b],
    )
    .ok()
}

fn rotation() -> Option<CycleResource> {
    let slot = Some(CycleSlot::Rotate {
        start: 16,
        end: 47,
        rate: 2,
        direction: CycleDirection::Forward,
    });
    CycleResource::new([slot, None, None, None]).ok()
}

fn run(events: &mut EventsManager) {
    let ramp: Vec<u8> = (0..PALETTE_SIZE).map(|i| ((i / 3) % 64 * 4) as u8).collect();
    events.int_data_mut().set_palette(ramp);
    events.show_cursor();
    events.start_cursor_blink();

    let Some(fade_in) = fade_map(Rgb::new(240, 160, 40), 50) else {
        return;
    };
    events.start_fade(&fade_in);
    if events.delay_click(100) == WaitOutcome::Quit {
        return;
    }
    events.clear_new_clicks();

    if let Some(cycle) = rotation() {
        events.start_cycle(cycle);
    }
    match events.delay_click(500) {
        WaitOutcome::Quit => return,
        WaitOutcome::Clicked => {
            let info = events.get_mouse_info();
            log::info!("clicked at ({}, {})", info.position.x, info.position.y);
        }
        WaitOutcome::Elapsed => {}
    }
    events.stop_cycle();

    if let Some(fade_out) = fade_map(Rgb::new(0, 0, 0), 25) {
        events.start_fade(&fade_out);
        events.delay(30);
    }
    events.stop_cursor_blink();
}

fn main() -> std::io::Result<()> {
    env_logger::init();

    let mut events = EventsManager::new(EventsConfig::from_env(), SystemClock::new());
    events.set_engine(Box::new(TerminalEngine { seconds: 0 }));
    events.set_input(Box::new(CrosstermInput::new()));
    events.init_color();
    events.start_main_clock_int();

    enable_raw_mode()?;
    if let Err(err) = enable_mouse() {
        disable_raw_mode()?;
        return Err(err);
    }
    run(&mut events);
    let mouse = disable_mouse();
    disable_raw_mode()?;
    mouse?;

    println!();
    println!(
        "{} frames, game counter {}",
        events.frame_count(),
        events.game_counter()
    );
    Ok(())
}
