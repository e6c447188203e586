//! Events Manager - Virtual clock, node dispatch, input and cursor state
//!
//! The host loop calls [`EventsManager::poll_events`] every iteration. Each
//! call drains host input, then checks the 50 Hz virtual clock. When a frame
//! has elapsed exactly one frame pass runs:
//!
//! ```text
//! flip countdown → flash → node dispatch → video timer → engine.on_frame
//! ```
//!
//! Blocking waits ([`delay`](EventsManager::delay),
//! [`delay_click`](EventsManager::delay_click),
//! [`s_wait_flip`](EventsManager::s_wait_flip)) keep polling, so fades,
//! cycles and blinking keep animating while game logic waits.
//!
//! # Example
//!
//! ```ignore
//! use playback_events::{EventsConfig, EventsManager, SystemClock};
//!
//! let mut events = EventsManager::new(EventsConfig::from_env(), SystemClock::new());
//! events.set_engine(Box::new(my_engine));
//! events.init_color();
//! events.start_main_clock_int();
//!
//! events.start_fade(&fade_to_black);
//! events.delay(25);
//! ```

use crate::clock::FrameClock;
use crate::config::EventsConfig;
use crate::cycle::ColorCycle;
use crate::data::{DataSlot, IntData};
use crate::engine::{EngineHooks, NullEngine};
use crate::fade::{Fade, FadeLevels, FadeState, Flash};
use crate::input::{HostEvent, HostInput, NoInput};
use crate::resources::{CMapResource, CycleResource, PictureResource};
use crate::scheduler::{Handler, IntNode, IntNodeList, NodeId};
use crate::state::cursor::{BLINK_LIT, CursorImage, CursorState, cursor_color};
use crate::state::mouse::{ButtonState, MouseInfo, MouseState};
use crate::types::{
    CMapFlags, CycleStatus, GAME_FRAME_RATE, GAME_FRAME_TIME, NodeFlags, PALETTE_COLORS, Point, Rgb,
};

/// Why a blocking wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitOutcome {
    /// The requested number of ticks elapsed.
    #[default]
    Elapsed,
    /// A mouse click arrived first.
    Clicked,
    /// The host or engine asked to quit.
    Quit,
}

pub struct EventsManager {
    config: EventsConfig,
    engine: Box<dyn EngineHooks>,
    clock: Box<dyn FrameClock>,
    input: Box<dyn HostInput>,

    nodes: IntNodeList,
    data: [IntData; 2],
    active_data: DataSlot,

    prior_frame_time: u64,
    frame_count: u64,
    game_counter: u32,

    mouse: MouseState,
    cursor: CursorState,
    blink_node: Option<NodeId>,

    fade: Fade,
    fade_levels: FadeLevels,
    flash: Option<Flash>,
    cycle: ColorCycle,

    quit_requested: bool,
    last_wait: WaitOutcome,
}

impl EventsManager {
    /// Manager with no engine and no input; wire them with
    /// [`set_engine`](Self::set_engine) and [`set_input`](Self::set_input).
    pub fn new(config: EventsConfig, clock: impl FrameClock + 'static) -> Self {
        let mut nodes = IntNodeList::new();
        let parked = NodeFlags::DISABLED | NodeFlags::EVERY_TICK;
        for id in [NodeId::FADE, NodeId::CYCLE] {
            if let Some(node) = nodes.get_mut(id) {
                *node = IntNode::new(0, 0, parked);
            }
        }

        let prior_frame_time = clock.now_millis();
        Self {
            config,
            engine: Box::new(NullEngine),
            clock: Box::new(clock),
            input: Box::new(NoInput),
            nodes,
            data: [IntData::new(), IntData::new()],
            active_data: DataSlot::Game,
            prior_frame_time,
            frame_count: 0,
            game_counter: 0,
            mouse: MouseState::new(),
            cursor: CursorState::new(),
            blink_node: None,
            fade: Fade::default(),
            fade_levels: FadeLevels::default(),
            flash: None,
            cycle: ColorCycle::default(),
            quit_requested: false,
            last_wait: WaitOutcome::default(),
        }
    }

    /// Second initialization step: attach the owning engine.
    pub fn set_engine(&mut self, engine: Box<dyn EngineHooks>) {
        self.engine = engine;
    }

    pub fn set_input(&mut self, input: Box<dyn HostInput>) {
        self.input = input;
    }

    pub fn config(&self) -> &EventsConfig {
        &self.config
    }

    // =========================================================================
    // Scheduler
    // =========================================================================

    /// Store a caller-defined node. Activate it with [`add_int_node`](Self::add_int_node).
    pub fn register_node(&mut self, node: IntNode) -> NodeId {
        self.nodes.register(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&IntNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut IntNode> {
        self.nodes.get_mut(id)
    }

    /// Activate a node from the next frame pass on. Duplicates are ignored.
    pub fn add_int_node(&mut self, id: NodeId) {
        self.nodes.add(id);
    }

    /// Deactivate a node. Absent nodes are ignored; the descriptor is kept.
    pub fn delete_int_node(&mut self, id: NodeId) {
        self.nodes.remove(id);
    }

    pub fn is_node_active(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Active node ids in dispatch order.
    pub fn active_nodes(&self) -> &[NodeId] {
        self.nodes.active()
    }

    fn set_node_enabled(&mut self, id: NodeId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_enabled(enabled);
        }
    }

    /// Install and activate the master clock, which runs every frame.
    pub fn start_main_clock_int(&mut self) {
        if let Some(node) = self.nodes.get_mut(NodeId::MAIN) {
            *node = IntNode::new(0, 1, NodeFlags::empty()).with_callback(Handler::MainClock);
        }
        self.add_int_node(NodeId::MAIN);
    }

    /// Frames the master clock has counted.
    pub fn game_counter(&self) -> u32 {
        self.game_counter
    }

    /// Frame passes run since construction.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Reference timestamp of the last frame pass.
    pub fn prior_frame_time(&self) -> u64 {
        self.prior_frame_time
    }

    /// Run the engine's per-second clock hook `amount` times right away.
    pub fn increment_time(&mut self, amount: u32) {
        for _ in 0..amount {
            self.engine.on_clock_second();
        }
    }

    // =========================================================================
    // Polling and dispatch
    // =========================================================================

    /// Drain host input, then advance the virtual clock.
    ///
    /// Input handling stops after one button transition so that each press
    /// and release is seen by a separate poll.
    pub fn poll_events(&mut self) {
        while let Some(event) = self.input.poll() {
            if event == HostEvent::Quit {
                log::debug!("quit requested by host");
                self.quit_requested = true;
                break;
            }
            if self.mouse.apply(&event) {
                break;
            }
        }
        self.check_for_next_frame_counter();
    }

    /// Run one frame pass if a frame interval has elapsed. The reference
    /// time moves by exactly one interval, so a stall is caught up one frame
    /// per call. Returns true when a pass ran.
    pub fn check_for_next_frame_counter(&mut self) -> bool {
        let now = self.clock.now_millis();
        if now.saturating_sub(self.prior_frame_time) < GAME_FRAME_TIME {
            return false;
        }
        self.prior_frame_time += GAME_FRAME_TIME;
        self.run_frame();
        true
    }

    fn run_frame(&mut self) {
        self.frame_count += 1;
        log::trace!("frame {}", self.frame_count);

        self.data[DataSlot::Game.index()].tick_flip();
        self.flash_int();
        self.dispatch_nodes();
        self.video_timer();
        self.engine.on_frame();
    }

    fn dispatch_nodes(&mut self) {
        for id in self.nodes.snapshot() {
            // Removed by an earlier callback in this pass.
            if !self.nodes.contains(id) {
                continue;
            }
            if let Some(handler) = self.nodes.countdown(id) {
                self.run_handler(handler);
                self.nodes.reload(id);
            }
        }
    }

    fn run_handler(&mut self, handler: Handler) {
        match handler {
            Handler::MainClock => self.main_clock_int(),
            Handler::Fade => self.fade_int(),
            Handler::FadeLevels => self.fade_levels.step(),
            Handler::Cycle => self.cycle_int(),
            Handler::CursorBlink => self.cursor_blink_int(),
            Handler::Custom(callback) => callback(self),
        }
    }

    fn main_clock_int(&mut self) {
        self.game_counter = self.game_counter.wrapping_add(1);
        if self.game_counter % GAME_FRAME_RATE == 0 {
            self.engine.on_clock_second();
        }
    }

    /// Push the active context's dirty palette range to the engine.
    fn video_timer(&mut self) {
        let data = &mut self.data[self.active_data.index()];
        if let Some((start, end)) = data.take_dirty() {
            self.engine
                .present_palette(start, &data.palette()[start * 3..(end + 1) * 3]);
        }
    }

    // =========================================================================
    // Shared data
    // =========================================================================

    /// Choose which context fades, cycles and cursor colors write to.
    pub fn select_data(&mut self, slot: DataSlot) {
        self.active_data = slot;
    }

    pub fn active_data_slot(&self) -> DataSlot {
        self.active_data
    }

    pub fn int_data(&self) -> &IntData {
        &self.data[self.active_data.index()]
    }

    pub fn int_data_mut(&mut self) -> &mut IntData {
        &mut self.data[self.active_data.index()]
    }

    pub fn data(&self, slot: DataSlot) -> &IntData {
        &self.data[slot.index()]
    }

    pub fn data_mut(&mut self, slot: DataSlot) -> &mut IntData {
        &mut self.data[slot.index()]
    }

    /// Primary context; the presentation layer sets `flip_wait` here.
    pub fn game_data(&self) -> &IntData {
        self.data(DataSlot::Game)
    }

    pub fn game_data_mut(&mut self) -> &mut IntData {
        self.data_mut(DataSlot::Game)
    }

    // =========================================================================
    // Fades
    // =========================================================================

    /// Bind the fade and cycle handlers and activate both nodes. They stay
    /// disabled until a fade or cycle starts.
    pub fn init_color(&mut self) {
        for (id, handler) in [(NodeId::FADE, Handler::Fade), (NodeId::CYCLE, Handler::Cycle)] {
            if let Some(node) = self.nodes.get_mut(id) {
                node.callback = Some(handler);
            }
            self.add_int_node(id);
        }
    }

    /// Begin fading `map.start..=map.end` toward the map's colors, one step
    /// per frame. With zero steps the colors are applied immediately.
    pub fn start_fade(&mut self, map: &CMapResource) {
        if let Err(err) = map.validate() {
            log::warn!("ignoring fade with invalid color map: {}", err);
            return;
        }
        if !self.nodes.contains(NodeId::FADE) {
            self.init_color();
        }

        let cycling = self.cycle.is_enabled();
        self.set_node_enabled(NodeId::FADE, false);
        if cycling {
            self.set_node_enabled(NodeId::CYCLE, false);
        }

        let data = &mut self.data[self.active_data.index()];
        if map.steps > 0 {
            self.fade.begin(map, data.palette());
            data.skip_fading = map.flags.contains(CMapFlags::HOLD);
            log::debug!(
                "fade {}..={} over {} steps ({:?})",
                map.start,
                map.end,
                map.steps,
                self.fade.state()
            );
            self.set_node_enabled(NodeId::FADE, true);
        } else {
            self.fade.apply_now(map, data.palette_mut());
            data.skip_fading = false;
            data.mark_dirty(map.start, map.end);
        }

        if cycling {
            self.set_node_enabled(NodeId::CYCLE, true);
        }
    }

    fn fade_int(&mut self) {
        let data = &mut self.data[self.active_data.index()];
        if data.skip_fading {
            return;
        }
        if self.fade.step(data.palette_mut()) {
            let (start, end) = self.fade.range();
            data.mark_dirty(start, end);
        }
        if !self.fade.state().is_active() {
            self.set_node_enabled(NodeId::FADE, false);
        }
    }

    pub fn fade_state(&self) -> FadeState {
        self.fade.state()
    }

    pub fn fade(&self) -> &Fade {
        &self.fade
    }

    /// Install the brightness-level ramp on the `fade2` node.
    pub fn add_fade_int(&mut self) {
        if let Some(node) = self.nodes.get_mut(NodeId::FADE2) {
            *node = IntNode::new(0, 1, NodeFlags::empty()).with_callback(Handler::FadeLevels);
        }
        self.add_int_node(NodeId::FADE2);
    }

    pub fn fade_levels(&self) -> &FadeLevels {
        &self.fade_levels
    }

    pub fn fade_levels_mut(&mut self) -> &mut FadeLevels {
        &mut self.fade_levels
    }

    // =========================================================================
    // Flash
    // =========================================================================

    /// Alternate palette entry `index` with `color` every `period` frames.
    /// Replaces any running flash.
    pub fn start_flash(&mut self, index: usize, color: Rgb, period: u16) {
        if index >= PALETTE_COLORS || period == 0 {
            log::warn!("ignoring flash of entry {} with period {}", index, period);
            return;
        }
        self.stop_flash();
        let slot = self.active_data;
        let data = &mut self.data[slot.index()];
        data.flash_step = period as i32;
        data.flash_timer = period as i32;
        self.flash = Some(Flash {
            slot,
            index,
            color,
            saved: Rgb::read(data.palette(), index),
            lit: false,
        });
    }

    /// Stop the flash and restore the entry's own color in the context the
    /// flash was started on.
    pub fn stop_flash(&mut self) {
        let Some(flash) = self.flash.take() else {
            return;
        };
        let data = &mut self.data[flash.slot.index()];
        data.flash_step = 0;
        data.flash_timer = 0;
        flash.saved.write(data.palette_mut(), flash.index);
        data.mark_dirty(flash.index, flash.index);
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    fn flash_int(&mut self) {
        let Some(flash) = self.flash.as_mut() else {
            return;
        };
        let data = &mut self.data[flash.slot.index()];
        if data.flash_step <= 0 {
            return;
        }
        data.flash_timer -= 1;
        if data.flash_timer > 0 {
            return;
        }
        data.flash_timer = data.flash_step;
        flash.toggle().write(data.palette_mut(), flash.index);
        data.mark_dirty(flash.index, flash.index);
    }

    // =========================================================================
    // Color cycling
    // =========================================================================

    /// Install a cycle resource, enable cycling and start the cycle node.
    /// Invalid resources are ignored.
    pub fn start_cycle(&mut self, resource: CycleResource) {
        if let Err(err) = resource.validate() {
            log::warn!("ignoring invalid cycle resource: {}", err);
            return;
        }
        if !self.nodes.contains(NodeId::CYCLE) {
            self.init_color();
        }
        self.cycle.load(resource);
        self.set_cycling_enabled(true);
        self.set_node_enabled(NodeId::CYCLE, true);
        log::debug!("color cycling started");
    }

    /// Stop cycling and hand back the resource.
    pub fn stop_cycle(&mut self) -> Option<CycleResource> {
        self.set_node_enabled(NodeId::CYCLE, false);
        self.cycle.unload()
    }

    /// Global gate for all four slots.
    pub fn set_cycling_enabled(&mut self, enabled: bool) {
        self.cycle.status.set(CycleStatus::ENABLED, enabled);
    }

    pub fn cycle(&self) -> &ColorCycle {
        &self.cycle
    }

    fn cycle_int(&mut self) {
        let data = &mut self.data[self.active_data.index()];
        if let Some((start, end)) = self.cycle.step(data.palette_mut()) {
            data.mark_dirty(start, end);
        }
    }

    // =========================================================================
    // Mouse
    // =========================================================================

    pub fn mouse(&self) -> &MouseState {
        &self.mouse
    }

    pub fn mouse_pos(&self) -> Point {
        self.mouse.position()
    }

    pub fn set_mouse_pos(&mut self, pos: Point) {
        self.mouse.set_position(pos);
    }

    /// Clear held and edge-triggered button flags.
    pub fn reset_mouse(&mut self) {
        self.mouse.reset();
    }

    /// Buttons currently held down.
    pub fn held_buttons(&self) -> ButtonState {
        self.mouse.held()
    }

    pub fn left_click(&self) -> bool {
        self.mouse.held().left
    }

    pub fn right_click(&self) -> bool {
        self.mouse.held().right
    }

    pub fn mouse_clicked(&self) -> bool {
        self.mouse.held().any()
    }

    /// A press happened since the last [`take_new_clicks`](Self::take_new_clicks).
    pub fn new_mouse_clicked(&self) -> bool {
        self.mouse.peek_new().any()
    }

    /// Read and clear the edge-triggered flags.
    pub fn take_new_clicks(&mut self) -> ButtonState {
        self.mouse.take_new()
    }

    pub fn clear_new_clicks(&mut self) {
        self.mouse.clear_new();
    }

    /// Poll, then return position, held buttons and the consumed clicks.
    pub fn get_mouse_info(&mut self) -> MouseInfo {
        self.poll_events();
        MouseInfo {
            position: self.mouse.position(),
            held: self.mouse.held(),
            clicked: self.mouse.take_new(),
        }
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    pub fn cursor(&self) -> &CursorState {
        &self.cursor
    }

    pub fn set_cursor(&mut self, pic: &PictureResource) {
        self.cursor.replace_image(CursorImage::from(pic));
    }

    /// Use a raw `width * height` bitmap as the cursor. Mismatched sizes are
    /// ignored.
    pub fn set_cursor_data(&mut self, data: &[u8], width: u16, height: u16, key_color: Option<u8>) {
        let needed = width as usize * height as usize;
        if needed == 0 || data.len() < needed {
            log::warn!(
                "ignoring {}x{} cursor with {} bytes",
                width,
                height,
                data.len()
            );
            return;
        }
        self.cursor.replace_image(CursorImage::centered(
            width,
            height,
            key_color,
            data[..needed].to_vec(),
        ));
    }

    /// Tint cursor palette entry `index` with color mode 0..=3.
    pub fn set_cursor_color(&mut self, index: usize, mode: usize) {
        let Some(color) = cursor_color(mode) else {
            log::debug!("ignoring cursor color mode {}", mode);
            return;
        };
        if index >= PALETTE_COLORS {
            log::warn!("ignoring cursor color for entry {}", index);
            return;
        }
        let data = self.int_data_mut();
        color.write(data.palette_mut(), index);
        data.mark_dirty(index, index);
    }

    pub fn show_cursor(&mut self) {
        self.cursor.show();
    }

    pub fn hide_cursor(&mut self) {
        self.cursor.hide();
    }

    /// Toggle the blink entry every `blink_interval_frames` frames.
    pub fn start_cursor_blink(&mut self) {
        let id = match self.blink_node {
            Some(id) => id,
            None => {
                let reset = self.config.blink_interval_frames.max(1);
                let node = IntNode::new(reset, reset, NodeFlags::empty())
                    .with_callback(Handler::CursorBlink);
                let id = self.nodes.register(node);
                self.blink_node = Some(id);
                id
            }
        };
        if self.nodes.contains(id) {
            return;
        }

        let index = self.config.blink_color_index;
        self.cursor.blinked = false;
        let data = self.int_data_mut();
        BLINK_LIT.write(data.palette_mut(), index);
        data.mark_dirty(index, index);
        self.add_int_node(id);
    }

    pub fn stop_cursor_blink(&mut self) {
        if let Some(id) = self.blink_node {
            self.delete_int_node(id);
        }
    }

    pub fn is_cursor_blinking(&self) -> bool {
        self.blink_node.is_some_and(|id| self.nodes.contains(id))
    }

    fn cursor_blink_int(&mut self) {
        let index = self.config.blink_color_index;
        let color = self.cursor.toggle_blink();
        let data = &mut self.data[self.active_data.index()];
        color.write(data.palette_mut(), index);
        data.mark_dirty(index, index);
    }

    /// Deactivate the evidence dimming node.
    pub fn stop_evid_dim(&mut self) {
        self.delete_int_node(NodeId::EV);
    }

    // =========================================================================
    // Blocking waits
    // =========================================================================

    fn should_quit(&self) -> bool {
        self.quit_requested || self.engine.should_quit()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Wait `cycles` frames while timers keep running.
    pub fn delay(&mut self, cycles: u32) {
        self.wait_frames(cycles, false);
    }

    /// Like [`delay`](Self::delay), but a click ends the wait early. The
    /// click stays pending for the caller to consume.
    pub fn delay_click(&mut self, cycles: u32) -> WaitOutcome {
        self.wait_frames(cycles, true)
    }

    /// How the most recent `delay`/`delay_click` ended.
    pub fn last_wait_outcome(&self) -> WaitOutcome {
        self.last_wait
    }

    fn wait_frames(&mut self, cycles: u32, stop_on_click: bool) -> WaitOutcome {
        let target = self.frame_count + cycles as u64;
        let outcome = loop {
            if self.should_quit() {
                break WaitOutcome::Quit;
            }
            if stop_on_click && self.mouse.peek_new().any() {
                break WaitOutcome::Clicked;
            }
            if self.frame_count >= target {
                break WaitOutcome::Elapsed;
            }
            self.clock.sleep_millis(self.config.poll_interval_ms);
            self.poll_events();
        };
        self.last_wait = outcome;
        outcome
    }

    /// Block until the presentation layer's pending flip is released.
    pub fn s_wait_flip(&mut self) {
        while self.game_data().flip_wait && !self.should_quit() {
            self.poll_events();
            self.clock.sleep_millis(self.config.poll_interval_ms);
        }
    }

    // =========================================================================
    // Event log
    // =========================================================================

    /// Format entry `index` of the engine's event log, e.g.
    /// `"003 10:05 am Video"`.
    pub fn evid_string(&self, index: usize) -> Option<String> {
        let record = self.engine.event_record(index)?;
        Some(format!(
            "{:03} {:02}:{:02} {} {}",
            index + 1,
            record.hour,
            record.minute,
            if record.is_am { "am" } else { "pm" },
            record.kind.name()
        ))
    }
}
