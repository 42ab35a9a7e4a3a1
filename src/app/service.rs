//! Game service: the hexagonal core.
//!
//! [`GameService`] owns the stage FSM, the shared context, and the input
//! conditioning (one debounce record per physical source).  All I/O flows
//! through port traits injected at call sites, so the whole game runs
//! against mock adapters in tests.
//!
//! ```text
//!  CommandSource ──▶ ┌────────────────────────┐
//!      InputPort ──▶ │      GameService       │ ──▶ EventSink
//!     OutputPort ◀── │  Stages · Puzzles · ⏱  │
//!                    └────────────────────────┘
//! ```
//!
//! One [`tick`](GameService::tick):
//!
//! 1. drain remote commands
//! 2. sample and debounce inputs
//! 3. countdown display and rate-limited timer event
//! 4. ambient star twinkle and link-status blink
//! 5. stage update (active puzzle's `play`, or the game master keypad)
//! 6. every puzzle's `service` (compartments, background hints)
//! 7. apply outputs, flushing the LED strip at most once
//! 8. hand queued events to the sink

use log::{debug, info};

use crate::config::GameConfig;
use crate::countdown::Countdown;
use crate::drivers::clock_display::encode_mmss;
use crate::drivers::debounce::{ButtonDebouncer, Debouncer};
use crate::drivers::led_patterns::{
    BlinkSequence, BlinkStep, COLOUR_CORRECT, COLOUR_INCORRECT, COLOUR_OFF, Rgb, StarTwinkle,
};
use crate::fsm::context::{GameContext, InputSnapshot, OutputFrame, RawInputs};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, Stage};
use crate::pins;
use crate::puzzles::stars::paint_progress;
use crate::puzzles::{Puzzle, PuzzleId, PuzzleModule, ResetScope};

use super::commands::RemoteCommand;
use super::events::GameEvent;
use super::ports::{CommandSource, EventSink, InputPort, OutputPort};

// ───────────────────────────────────────────────────────────────
// GameService
// ───────────────────────────────────────────────────────────────

pub struct GameService {
    fsm: Fsm,
    ctx: GameContext,

    // -- Input conditioning --
    keys: Debouncer<char>,
    transfer_button: ButtonDebouncer,
    reset_button: ButtonDebouncer,

    // -- Ambient --
    twinkle: StarTwinkle,
    link_blink: BlinkSequence,
    link_colour: Rgb,

    last_timer_publish_ms: Option<u64>,
    tick_count: u64,
}

impl GameService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the sequencer; call [`start`](Self::start) next.
    pub fn new(config: GameConfig) -> Self {
        let debounce = config.debounce_ms;
        let twinkle = StarTwinkle::new(
            config.stars.twinkle_interval_ms,
            config.stars.twinkle_steps,
            pins::STAR_LEDS.len(),
        );
        let link_blink = BlinkSequence::new(config.stars.feedback_blink_interval_ms);
        Self {
            fsm: Fsm::new(build_state_table(), Stage::Ready),
            ctx: GameContext::new(config),
            keys: Debouncer::new(debounce),
            transfer_button: ButtonDebouncer::new(debounce),
            reset_button: ButtonDebouncer::new(debounce),
            twinkle,
            link_blink,
            link_colour: COLOUR_OFF,
            last_timer_publish_ms: None,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Draw every puzzle's initial state and enter `Ready`.
    pub fn start(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        self.ctx.inputs.now_ms = now_ms;
        for puzzle in self.ctx.puzzles.iter_mut() {
            puzzle.setup(&mut self.ctx.outputs);
        }
        self.fsm.start(&mut self.ctx);
        self.ctx.emit(GameEvent::Started(self.fsm.current_state()));
        self.flush_events(sink);
        info!("GameService started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full cycle.  `hw` satisfies both [`InputPort`] and
    /// [`OutputPort`] to avoid a double mutable borrow.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl InputPort + OutputPort),
        commands: &mut impl CommandSource,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        self.ctx.inputs.now_ms = now_ms;

        // 1. Remote commands
        while let Some(text) = commands.next_command() {
            match RemoteCommand::parse(&text) {
                Some(cmd) => self.handle_command(cmd, now_ms),
                None => debug!("Ignoring unknown command {:?}", text.as_str()),
            }
        }

        // 2. Inputs
        let raw = hw.read_inputs();
        self.ctx.inputs = self.condition(raw, now_ms);

        // 3. Countdown
        self.update_clock(now_ms);

        // 4. Ambient animations
        if let Some((slot, colour)) = self.twinkle.tick(now_ms) {
            self.ctx.outputs.pixels.set(pins::STAR_LEDS[slot], colour);
        }
        self.run_link_blink(now_ms);

        // 5. Stage
        let prev = self.fsm.current_state();
        self.fsm.tick(&mut self.ctx);
        self.note_stage_change(prev);

        // 6. Compartments and background hint work
        for puzzle in self.ctx.puzzles.iter_mut() {
            puzzle.service(now_ms, &mut self.ctx.outputs);
        }

        // 7. Outputs
        Self::apply_outputs(&mut self.ctx.outputs, hw);

        // 8. Events
        self.flush_events(sink);
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply one remote command.  Leaves every puzzle consistent; the stage
    /// catches up with remote solves on the next tick.
    pub fn handle_command(&mut self, cmd: RemoteCommand, now_ms: u64) {
        self.ctx.inputs.now_ms = now_ms;
        let prev = self.fsm.current_state();
        info!("Remote command: {:?}", cmd);

        match cmd {
            RemoteCommand::StartGame => {
                if prev == Stage::Ready {
                    self.ctx.countdown.start(now_ms);
                    self.fsm.force_transition(Stage::Wheels, &mut self.ctx);
                } else {
                    debug!("start_game ignored in {:?}", prev);
                }
            }
            RemoteCommand::GlobalReset => {
                self.ctx.global_reset(false);
                self.fsm.force_transition(Stage::Ready, &mut self.ctx);
            }
            RemoteCommand::AddMinute => {
                self.ctx.countdown.add_secs(self.ctx.config.duration_step_secs);
                self.last_timer_publish_ms = None;
            }
            RemoteCommand::SubMinute => {
                if self.ctx.countdown.sub_secs(self.ctx.config.duration_step_secs) {
                    self.last_timer_publish_ms = None;
                } else {
                    debug!("sub_min ignored at {} s", self.ctx.countdown.duration_secs());
                }
            }
            RemoteCommand::Hint(id) => {
                self.ctx.puzzles[id.index()].hint(now_ms, &mut self.ctx.outputs);
            }
            RemoteCommand::Solve(id) => {
                if self.ctx.puzzles[id.index()].solve(now_ms, &mut self.ctx.outputs) {
                    info!("{} solved remotely", id);
                }
            }
            RemoteCommand::Reset(id) => {
                self.ctx.puzzles[id.index()].reset(ResetScope::Local, &mut self.ctx.outputs);
            }
            RemoteCommand::OpenCompartment(id) => self.ctx.open_compartment(id),
        }

        self.note_stage_change(prev);
    }

    /// Flash the keypad LEDs green (broker connected) or red (gave up).
    /// Skipped during the passcode stage, which owns those LEDs.
    pub fn signal_link(&mut self, connected: bool) {
        if self.fsm.current_state() == Stage::Stars {
            return;
        }
        self.link_colour = if connected { COLOUR_CORRECT } else { COLOUR_INCORRECT };
        self.link_blink.start(self.ctx.config.stars.feedback_blink_count);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn stage(&self) -> Stage {
        self.fsm.current_state()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn puzzle(&self, id: PuzzleId) -> &PuzzleModule {
        self.ctx.puzzle(id)
    }

    pub fn countdown(&self) -> &Countdown {
        &self.ctx.countdown
    }

    pub fn outputs(&self) -> &OutputFrame {
        &self.ctx.outputs
    }

    pub fn config(&self) -> &GameConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn condition(&mut self, raw: RawInputs, now_ms: u64) -> InputSnapshot {
        InputSnapshot {
            now_ms,
            wheels_aligned: raw.wheels_sensor,
            transfer_pressed: self.transfer_button.pressed(raw.transfer_button, now_ms),
            reset_pressed: self.reset_button.pressed(raw.reset_button, now_ms),
            port_link: raw.port_link,
            key: self.keys.sample(raw.key, now_ms),
        }
    }

    fn update_clock(&mut self, now_ms: u64) {
        if self.fsm.current_state() == Stage::Solved {
            return;
        }
        let remaining_secs = self.ctx.countdown.remaining_secs(now_ms);
        self.ctx.outputs.clock = encode_mmss(remaining_secs);

        let interval = u64::from(self.ctx.config.timer_publish_interval_ms);
        let due = self
            .last_timer_publish_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= interval);
        if due {
            self.last_timer_publish_ms = Some(now_ms);
            self.ctx.emit(GameEvent::TimerUpdate { remaining_secs });
        }
    }

    fn run_link_blink(&mut self, now_ms: u64) {
        let out = &mut self.ctx.outputs;
        if self.fsm.current_state() == Stage::Stars {
            if self.link_blink.is_running() {
                self.link_blink.cancel();
                paint_progress(out, 0, COLOUR_OFF);
            }
            return;
        }
        match self.link_blink.tick(now_ms) {
            BlinkStep::Light => paint_progress(out, pins::STAR_PROGRESS_LEDS.len(), self.link_colour),
            BlinkStep::Dark | BlinkStep::Finished => paint_progress(out, 0, COLOUR_OFF),
            BlinkStep::Hold => {}
        }
    }

    fn note_stage_change(&mut self, prev: Stage) {
        let now = self.fsm.current_state();
        if now != prev {
            self.ctx.emit(GameEvent::StageChanged { from: prev, to: now });
        }
    }

    fn apply_outputs(out: &mut OutputFrame, hw: &mut impl OutputPort) {
        for id in PuzzleId::ALL {
            hw.set_relay(id, out.relays[id.index()]);
        }
        hw.set_transfer_led(out.transfer_led);
        if let Some(frame) = out.pixels.take_dirty() {
            hw.show_pixels(frame);
        }
        hw.show_clock(out.clock);
    }

    fn flush_events(&mut self, sink: &mut impl EventSink) {
        for event in self.ctx.take_events() {
            sink.emit(&event);
        }
    }
}
