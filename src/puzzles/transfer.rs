//! Liquid transfer simulation behind the fuel puzzle.
//!
//! Containers have fixed capacities and integer volumes.  A transfer moves
//! one unit from `from` to `to` per interval until the source is empty or
//! the destination is full.  Every mutation preserves
//! `0 <= volume[i] <= capacity[i]`.

use crate::config::FUEL_CONTAINERS;

pub type Volumes = [u8; FUEL_CONTAINERS];

/// Outcome of one [`TransferSim::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStep {
    /// A unit moved on this call.
    Moved,
    /// A unit can move but the interval has not elapsed.
    Waiting,
    /// Nothing can move between this pair.
    Complete,
}

#[derive(Debug, Clone)]
pub struct TransferSim {
    capacities: Volumes,
    volumes: Volumes,
    interval_ms: u32,
    last_move_ms: Option<u64>,
}

impl TransferSim {
    /// `start` is clamped to the capacities.
    pub fn new(capacities: Volumes, start: Volumes, interval_ms: u32) -> Self {
        let mut sim = Self {
            capacities,
            volumes: [0; FUEL_CONTAINERS],
            interval_ms,
            last_move_ms: None,
        };
        sim.set_volumes(start);
        sim
    }

    pub fn volumes(&self) -> Volumes {
        self.volumes
    }

    pub fn capacities(&self) -> Volumes {
        self.capacities
    }

    /// Replace all volumes (clamped) and restart the pour cadence.
    pub fn set_volumes(&mut self, volumes: Volumes) {
        for (v, (&want, &cap)) in self
            .volumes
            .iter_mut()
            .zip(volumes.iter().zip(self.capacities.iter()))
        {
            *v = want.min(cap);
        }
        self.last_move_ms = None;
    }

    /// Units that could still move from `from` into `to`.
    pub fn movable(&self, from: usize, to: usize) -> u8 {
        if from == to || from >= FUEL_CONTAINERS || to >= FUEL_CONTAINERS {
            return 0;
        }
        self.volumes[from].min(self.capacities[to] - self.volumes[to])
    }

    pub fn can_transfer(&self, from: usize, to: usize) -> bool {
        self.movable(from, to) > 0
    }

    /// Move at most one unit, honouring the interval.
    pub fn step(&mut self, from: usize, to: usize, now_ms: u64) -> TransferStep {
        if !self.can_transfer(from, to) {
            return TransferStep::Complete;
        }
        let waiting = self
            .last_move_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < u64::from(self.interval_ms));
        if waiting {
            return TransferStep::Waiting;
        }
        self.last_move_ms = Some(now_ms);
        self.volumes[from] -= 1;
        self.volumes[to] += 1;
        TransferStep::Moved
    }

    /// Pour `from` into `to` until no unit can move, ignoring the cadence.
    pub fn pour_all(&mut self, from: usize, to: usize) {
        let n = self.movable(from, to);
        if n > 0 {
            self.volumes[from] -= n;
            self.volumes[to] += n;
        }
    }

    /// First container holding exactly `target` units.
    pub fn container_holding(&self, target: u8) -> Option<usize> {
        self.volumes.iter().position(|&v| v == target)
    }
}
