//! Fuel puzzle: pour between three containers until one holds the target.
//!
//! Players patch a cable between two container ports; the transfer LED
//! lights while a unit can move, and a press of the transfer button latches
//! the pour until the source empties or the destination fills.  Reaching
//! the target plays a green blink on the solving container before the
//! puzzle reports solved.
//!
//! The hint performs the configured pours itself, one unit per interval,
//! from `service()` so it keeps running whatever the active stage.  A reset
//! restores the volumes the hint has already established.

use log::{debug, info};

use crate::config::{FUEL_CONTAINERS, FuelConfig, RelayPulseConfig};
use crate::drivers::led_patterns::{BlinkSequence, BlinkStep, COLOUR_CORRECT, COLOUR_FUEL, COLOUR_OFF, Rgb};
use crate::fsm::context::{InputSnapshot, OutputFrame};
use crate::pins;

use super::hint::{HintProgression, HintState};
use super::transfer::{TransferSim, TransferStep, Volumes};
use super::{Progress, Puzzle, PuzzleId, ResetScope, SolveLatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelState {
    /// Waiting for a cable and a button press.
    Idle,
    /// Latched pour between two containers.
    Pouring { from: usize, to: usize },
    /// Target reached; blinking the container that holds it.
    Celebrating { container: usize },
}

#[derive(Debug, Clone)]
pub struct FuelPuzzle {
    config: FuelConfig,
    sim: TransferSim,
    state: FuelState,
    blink: BlinkSequence,
    hint: HintProgression,
    latch: SolveLatch,
}

impl FuelPuzzle {
    pub fn new(config: &FuelConfig, pulse: RelayPulseConfig) -> Self {
        Self {
            sim: TransferSim::new(config.capacities, config.start, config.transfer_interval_ms),
            state: FuelState::Idle,
            blink: BlinkSequence::new(config.solved_blink_interval_ms),
            hint: HintProgression::new(config.hint_pours.len() as u8),
            latch: SolveLatch::new(pulse),
            config: config.clone(),
        }
    }

    pub fn volumes(&self) -> Volumes {
        self.sim.volumes()
    }

    pub fn state(&self) -> FuelState {
        self.state
    }

    /// Start volumes with the completed hint pours applied.
    fn baseline(&self) -> Volumes {
        let mut sim = TransferSim::new(self.config.capacities, self.config.start, 0);
        for &(from, to) in self.config.hint_pours.iter().take(self.hint.completed_steps()) {
            sim.pour_all(usize::from(from), usize::from(to));
        }
        sim.volumes()
    }

    fn cancel(&mut self) {
        self.state = FuelState::Idle;
        self.blink.cancel();
    }

    fn restore(&mut self, out: &mut OutputFrame) {
        self.cancel();
        self.sim.set_volumes(self.baseline());
        out.transfer_led = false;
        self.draw(out);
    }

    /// First LED slot of `container` in the level map.
    fn led_offset(&self, container: usize) -> usize {
        self.config
            .capacities
            .iter()
            .take(container)
            .map(|&c| usize::from(c))
            .sum()
    }

    /// Paint every level LED: filled units blue, empty units dark.
    fn draw(&self, out: &mut OutputFrame) {
        let volumes = self.sim.volumes();
        for container in 0..FUEL_CONTAINERS {
            let offset = self.led_offset(container);
            for unit in 0..usize::from(self.config.capacities[container]) {
                let colour = if unit < usize::from(volumes[container]) {
                    COLOUR_FUEL
                } else {
                    COLOUR_OFF
                };
                if let Some(&led) = pins::FUEL_LED_MAP.get(offset + unit) {
                    out.pixels.set(led, colour);
                }
            }
        }
    }

    fn paint_target(&self, container: usize, colour: Rgb, out: &mut OutputFrame) {
        let offset = self.led_offset(container);
        for unit in 0..usize::from(self.config.target) {
            if let Some(&led) = pins::FUEL_LED_MAP.get(offset + unit) {
                out.pixels.set(led, colour);
            }
        }
    }

    fn celebrate(&mut self, container: usize, now_ms: u64, out: &mut OutputFrame) -> Progress {
        match self.blink.tick(now_ms) {
            BlinkStep::Light => self.paint_target(container, COLOUR_CORRECT, out),
            BlinkStep::Dark => self.paint_target(container, COLOUR_OFF, out),
            BlinkStep::Hold | BlinkStep::Finished => {}
        }
        if self.blink.is_running() {
            return Progress::Pending;
        }
        self.draw(out);
        Progress::Solved
    }
}

impl Puzzle for FuelPuzzle {
    fn id(&self) -> PuzzleId {
        PuzzleId::Fuel
    }

    fn latch(&self) -> &SolveLatch {
        &self.latch
    }

    fn latch_mut(&mut self) -> &mut SolveLatch {
        &mut self.latch
    }

    fn hint_state(&self) -> HintState {
        self.hint.state()
    }

    fn setup(&mut self, out: &mut OutputFrame) {
        out.relays[PuzzleId::Fuel.index()] = false;
        self.restore(out);
    }

    fn reset(&mut self, scope: ResetScope, out: &mut OutputFrame) {
        if scope == ResetScope::Global {
            self.hint.clear();
        }
        self.latch.clear();
        self.restore(out);
        debug!("Fuel: reset ({:?}) to {:?}", scope, self.sim.volumes());
    }

    fn hint(&mut self, _now_ms: u64, out: &mut OutputFrame) {
        if !self.latch.is_unsolved() {
            return;
        }
        if self.hint.request() {
            info!("Fuel: hint started, pouring {:?}", self.config.hint_pours);
            self.restore(out);
        }
    }

    fn play(&mut self, inputs: &InputSnapshot, out: &mut OutputFrame) -> Progress {
        if !self.latch.is_unsolved() || self.hint.in_progress().is_some() {
            out.transfer_led = false;
            return Progress::Pending;
        }
        let now = inputs.now_ms;

        if inputs.reset_pressed {
            info!("Fuel: reset button");
            self.restore(out);
        }

        let pair = match self.state {
            FuelState::Celebrating { container } => return self.celebrate(container, now, out),
            FuelState::Pouring { from, to } => Some((from, to)),
            FuelState::Idle => inputs.port_link,
        };

        match pair {
            Some((from, to)) if self.sim.can_transfer(from, to) => {
                out.transfer_led = true;
                let latched = matches!(self.state, FuelState::Pouring { .. });
                if latched || inputs.transfer_pressed {
                    self.state = FuelState::Pouring { from, to };
                    if self.sim.step(from, to, now) == TransferStep::Moved {
                        self.draw(out);
                    }
                }
            }
            _ => {
                self.state = FuelState::Idle;
                out.transfer_led = false;
            }
        }

        if self.state == FuelState::Idle {
            if let Some(container) = self.sim.container_holding(self.config.target) {
                info!("Fuel: container {} holds {}", container, self.config.target);
                self.state = FuelState::Celebrating { container };
                self.blink.start(self.config.solved_blink_count);
                out.transfer_led = false;
            }
        }
        Progress::Pending
    }

    fn solve(&mut self, now_ms: u64, out: &mut OutputFrame) -> bool {
        if !self.latch.trigger(now_ms) {
            return false;
        }
        self.cancel();
        out.transfer_led = false;
        self.draw(out);
        true
    }

    fn service(&mut self, now_ms: u64, out: &mut OutputFrame) {
        out.relays[PuzzleId::Fuel.index()] = self.latch.service(now_ms);

        if !self.latch.is_unsolved() {
            return;
        }
        let Some(step) = self.hint.in_progress() else {
            return;
        };
        let Some(&(from, to)) = self.config.hint_pours.get(usize::from(step)) else {
            self.hint.advance();
            return;
        };
        match self.sim.step(usize::from(from), usize::from(to), now_ms) {
            TransferStep::Moved => self.draw(out),
            TransferStep::Waiting => {}
            TransferStep::Complete => {
                self.hint.advance();
                info!("Fuel: hint now {:?}", self.hint.state());
            }
        }
    }
}
