//! Race session: the field of cars, lap progress, and win detection
//!
//! The session owns every counter that was ever tempted to be a global:
//! car ids, powerup ids, the tick clock and the seeded RNG. The host
//! engine drives it with `tick()` plus the `on_*` contact handlers and
//! drains [`RaceEvent`]s for presentation.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::powerup::{PowerupKind, PowerupSpot};
use super::strategy::{DriveCommand, DriveStrategy};
use super::vehicle::{CarTuning, VehicleState};
use crate::consts::FALL_RECOVERY_MARGIN;
use crate::track::{Track, TrackGeometry};

/// Session-unique vehicle identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarId(u32);

impl CarId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "car {}", self.0)
    }
}

/// Observable things that happened during the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceEvent {
    CheckpointPassed { car: CarId, gate: usize },
    /// An out-of-order gate crossing; no progress, but worth surfacing.
    GateIgnored { car: CarId, gate: usize },
    LapCompleted { car: CarId, lap: u32 },
    Won { car: CarId },
    PowerupCollected { car: CarId, kind: PowerupKind },
    PowerupExpired { car: CarId },
    FellThroughFloor { car: CarId },
}

/// One entrant: dynamic state plus an optional AI strategy. A car with
/// no strategy is player-controlled through [`RaceSession::apply_input`].
pub struct Car {
    pub id: CarId,
    pub state: VehicleState,
    pub tuning: CarTuning,
    strategy: Option<Box<dyn DriveStrategy>>,
}

impl Car {
    pub fn is_ai(&self) -> bool {
        self.strategy.is_some()
    }
}

/// A single race from grid to finish.
pub struct RaceSession {
    track: Track,
    geometry: TrackGeometry,
    total_laps: u32,
    seed: u64,
    rng: Pcg32,
    cars: Vec<Car>,
    powerups: Vec<PowerupSpot>,
    events: Vec<RaceEvent>,
    time_ticks: u64,
    paused: bool,
    winner: Option<CarId>,
    next_car_id: u32,
    next_powerup_id: u32,
}

impl RaceSession {
    /// Geometry must be fully built before the session exists; start
    /// slots and initial facing come from the boundary at gate 0.
    pub fn new(track: Track, geometry: TrackGeometry, total_laps: u32, seed: u64) -> Self {
        Self {
            track,
            geometry,
            total_laps,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            cars: Vec::new(),
            powerups: Vec::new(),
            events: Vec::new(),
            time_ticks: 0,
            paused: false,
            winner: None,
            next_car_id: 0,
            next_powerup_id: 0,
        }
    }

    /// Add a player-controlled car. Call [`Self::start_race`] once the
    /// whole field is assembled.
    pub fn add_player(&mut self) -> CarId {
        self.add_car(None)
    }

    /// Add an AI car driven by `strategy`.
    pub fn add_ai(&mut self, strategy: Box<dyn DriveStrategy>) -> CarId {
        self.add_car(Some(strategy))
    }

    fn add_car(&mut self, strategy: Option<Box<dyn DriveStrategy>>) -> CarId {
        let id = CarId(self.next_car_id);
        self.next_car_id += 1;

        let slot = self.cars.len();
        let (pos, yaw) = self.geometry.start_slot(slot, slot + 1);
        self.cars.push(Car {
            id,
            state: VehicleState::new(self.geometry.gate_count(), pos, yaw),
            tuning: CarTuning::default(),
            strategy,
        });
        id
    }

    /// Line the field up on the grid and reset the clock. Also serves
    /// as a full race restart.
    pub fn start_race(&mut self) {
        let total = self.cars.len();
        for (slot, car) in self.cars.iter_mut().enumerate() {
            let (pos, yaw) = self.geometry.start_slot(slot, total);
            car.state = VehicleState::new(self.geometry.gate_count(), pos, yaw);
        }
        self.time_ticks = 0;
        self.paused = false;
        self.winner = None;
        self.events.clear();
        log::info!("race start: {} cars, {} laps", total, self.total_laps);
    }

    /// Scatter `count` powerup spots along random centerline spans.
    pub fn scatter_powerups(&mut self, count: usize) {
        for _ in 0..count {
            let span = self.rng.random_range(0..self.track.len());
            let (a, b) = self.track.span(span);
            let t = self.rng.random_range(0.15..0.85f32);
            let kind = if self.rng.random::<f32>() < 0.5 {
                PowerupKind::SpeedBoost
            } else {
                PowerupKind::Shield
            };

            let id = self.next_powerup_id;
            self.next_powerup_id += 1;
            self.powerups.push(PowerupSpot {
                id,
                kind,
                pos: a.lerp(b, t),
            });
        }
        log::info!("{} powerups on track", self.powerups.len());
    }

    /// Advance the simulation by one fixed timestep.
    pub fn tick(&mut self) {
        if self.paused || self.winner.is_some() {
            return;
        }
        self.time_ticks += 1;

        for i in 0..self.cars.len() {
            let expired = {
                let car = &mut self.cars[i];
                car.state.tick_powerup(self.time_ticks).map(|_| car.id)
            };
            if let Some(id) = expired {
                self.events.push(RaceEvent::PowerupExpired { car: id });
            }

            let car = &mut self.cars[i];
            if let Some(strategy) = car.strategy.as_mut() {
                let command = strategy.next_input(&car.state, &self.geometry, &self.powerups);
                Self::apply(&mut car.state, &car.tuning, &command);
            }
            car.state.update_movement(&car.tuning);
        }

        // A car below the lowest boundary point (with margin) fell
        // through the geometry; recover it, never crash the race.
        let floor = self.geometry.min_boundary_height - FALL_RECOVERY_MARGIN;
        for i in 0..self.cars.len() {
            if self.cars[i].state.pos.z < floor {
                self.respawn(i);
            }
        }
    }

    fn apply(state: &mut VehicleState, tuning: &CarTuning, command: &DriveCommand) {
        state.drifting = command.drifting;
        if let Some(direction) = command.drive {
            state.drive(direction, tuning);
        }
        if let Some(direction) = command.turn {
            state.turn(direction, tuning);
        }
    }

    /// Feed one tick of player input to a car.
    pub fn apply_input(&mut self, id: CarId, command: &DriveCommand) {
        if let Some(car) = self.cars.iter_mut().find(|c| c.id == id) {
            Self::apply(&mut car.state, &car.tuning, command);
        }
    }

    fn respawn(&mut self, index: usize) {
        let total = self.cars.len();
        let (pos, yaw) = self.geometry.start_slot(index, total);

        let car = &mut self.cars[index];
        log::info!("{} fell through the geometry, back to the grid", car.id);
        car.state.pos = pos;
        car.state.yaw = yaw;
        car.state.speed = 0.0;
        car.state.rotation_speed = 0.0;
        car.state.acceleration = 0.0;
        car.state.rotation_acceleration = 0.0;
        car.state.reset_progress();

        let id = car.id;
        self.events.push(RaceEvent::FellThroughFloor { car: id });
    }

    /// The host collision system reports a car sweeping across gate
    /// `gate`. Valid forward progress advances the car's pass counts;
    /// anything else is a logged no-op.
    pub fn on_checkpoint_crossed(&mut self, id: CarId, gate: usize) {
        let gate_count = self.geometry.gate_count();
        if gate >= gate_count {
            log::warn!("{id} crossed unknown gate {gate}");
            return;
        }
        let total_laps = self.total_laps;
        let Some(car) = self.cars.iter_mut().find(|c| c.id == id) else {
            log::warn!("checkpoint crossing for unknown {id}");
            return;
        };
        let state = &mut car.state;
        if state.finished {
            return;
        }

        if gate > 0 && state.passed_checkpoints[gate - 1] > state.passed_checkpoints[gate] {
            state.passed_checkpoints[gate] += 1;
            self.events.push(RaceEvent::CheckpointPassed { car: id, gate });
        } else if gate == 0
            && state.passed_checkpoints[0] == state.passed_checkpoints[gate_count - 1]
        {
            state.laps += 1;
            state.passed_checkpoints[0] += 1;
            log::info!("{id} completed lap {}", state.laps);
            self.events.push(RaceEvent::LapCompleted {
                car: id,
                lap: state.laps,
            });

            if state.laps >= total_laps {
                state.finished = true;
                self.events.push(RaceEvent::Won { car: id });
                if self.winner.is_none() {
                    self.winner = Some(id);
                    log::info!("{id} wins the race");
                }
            }
        } else {
            log::debug!("{id} crossed gate {gate} out of order");
            self.events.push(RaceEvent::GateIgnored { car: id, gate });
        }
    }

    /// The host collision system reports wall contact.
    pub fn on_wall_contact(&mut self, id: CarId) {
        if let Some(car) = self.cars.iter_mut().find(|c| c.id == id) {
            car.state.on_wall_contact();
        }
    }

    /// The host collision system reports a powerup pickup.
    pub fn on_powerup_collected(&mut self, id: CarId, kind: PowerupKind) {
        let now = self.time_ticks;
        if let Some(car) = self.cars.iter_mut().find(|c| c.id == id) {
            car.state.collect_powerup(kind, now);
            log::info!("{id} picked up a {}", kind.as_str());
            self.events.push(RaceEvent::PowerupCollected { car: id, kind });
        }
    }

    /// Remove a collected spot from the track, returning its kind.
    pub fn take_powerup_spot(&mut self, spot_id: u32) -> Option<PowerupKind> {
        let index = self.powerups.iter().position(|s| s.id == spot_id)?;
        Some(self.powerups.remove(index).kind)
    }

    /// Drain accumulated events in occurrence order.
    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn total_laps(&self) -> u32 {
        self.total_laps
    }

    pub fn winner(&self) -> Option<CarId> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn car(&self, id: CarId) -> Option<&Car> {
        self.cars.iter().find(|c| c.id == id)
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    pub fn powerups(&self) -> &[PowerupSpot] {
        &self.powerups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::POWERUP_DURATION_TICKS;
    use crate::sim::strategy::GateChaser;
    use crate::track::TrackLayout;
    use glam::Vec3;

    fn session() -> RaceSession {
        let track = Track::from_points(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 100.0, 0.0),
            Vec3::new(100.0, 100.0, 0.0),
            Vec3::new(100.0, 0.0, 0.0),
        ])
        .unwrap();
        let layout = TrackLayout {
            width: 10.0,
            ..TrackLayout::default()
        };
        let geometry = TrackGeometry::build(&track, &layout).unwrap();
        RaceSession::new(track, geometry, 3, 1234)
    }

    fn cross_full_lap(session: &mut RaceSession, id: CarId) {
        for gate in [1, 2, 3, 0] {
            session.on_checkpoint_crossed(id, gate);
        }
    }

    #[test]
    fn test_in_order_crossings_advance() {
        let mut session = session();
        let id = session.add_player();
        session.start_race();

        session.on_checkpoint_crossed(id, 1);
        session.on_checkpoint_crossed(id, 2);
        let state = &session.car(id).unwrap().state;
        assert_eq!(state.passed_checkpoints, vec![1, 1, 1, 0]);
        assert_eq!(state.laps, 0);
    }

    #[test]
    fn test_out_of_order_crossing_is_noop() {
        let mut session = session();
        let id = session.add_player();
        session.start_race();

        session.on_checkpoint_crossed(id, 2);
        session.on_checkpoint_crossed(id, 3);
        let state = &session.car(id).unwrap().state;
        assert_eq!(state.passed_checkpoints, vec![1, 0, 0, 0]);

        let events = session.drain_events();
        assert!(events.contains(&RaceEvent::GateIgnored { car: id, gate: 2 }));
    }

    #[test]
    fn test_repeat_crossing_does_not_double_count() {
        let mut session = session();
        let id = session.add_player();
        session.start_race();

        session.on_checkpoint_crossed(id, 1);
        session.on_checkpoint_crossed(id, 1);
        let state = &session.car(id).unwrap().state;
        assert_eq!(state.passed_checkpoints, vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_start_line_needs_full_cycle() {
        let mut session = session();
        let id = session.add_player();
        session.start_race();

        // Touching the start line again right away is not a lap.
        session.on_checkpoint_crossed(id, 0);
        let state = &session.car(id).unwrap().state;
        assert_eq!(state.laps, 0);
        assert_eq!(state.passed_checkpoints, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_lap_counting_and_win() {
        let mut session = session();
        let id = session.add_player();
        session.start_race();

        cross_full_lap(&mut session, id);
        assert_eq!(session.car(id).unwrap().state.laps, 1);
        assert!(session.winner().is_none());

        cross_full_lap(&mut session, id);
        cross_full_lap(&mut session, id);
        assert_eq!(session.car(id).unwrap().state.laps, 3);
        assert!(session.car(id).unwrap().state.finished);
        assert_eq!(session.winner(), Some(id));

        let events = session.drain_events();
        let wins = events
            .iter()
            .filter(|e| matches!(e, RaceEvent::Won { .. }))
            .count();
        assert_eq!(wins, 1);

        // Crossings after the finish change nothing.
        cross_full_lap(&mut session, id);
        assert_eq!(session.car(id).unwrap().state.laps, 3);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_pass_counts_stay_in_lockstep() {
        let mut session = session();
        let id = session.add_player();
        session.start_race();

        // Hammer gates in odd orders; no counter may ever lead its
        // predecessor.
        let pattern = [1, 1, 3, 2, 2, 0, 3, 1, 0, 2, 3, 0, 1];
        for gate in pattern {
            session.on_checkpoint_crossed(id, gate);
            let passed = &session.car(id).unwrap().state.passed_checkpoints;
            for k in 1..passed.len() {
                assert!(
                    passed[k] <= passed[k - 1],
                    "gate {k} leads after {passed:?}"
                );
            }
        }
    }

    #[test]
    fn test_respawn_resets_progress_keeps_laps() {
        let mut session = session();
        let id = session.add_player();
        session.start_race();

        cross_full_lap(&mut session, id);
        session.on_checkpoint_crossed(id, 1);
        let _ = session.drain_events();

        // Shove the car well below the track and let the tick recover it.
        if let Some(car) = session.cars.iter_mut().find(|c| c.id == id) {
            car.state.pos.z = -100.0;
        }
        session.tick();

        let state = &session.car(id).unwrap().state;
        assert_eq!(state.laps, 1, "laps survive a fall");
        assert_eq!(state.passed_checkpoints, vec![1, 0, 0, 0]);
        assert_eq!(state.speed, 0.0);
        assert!(state.pos.z > -50.0, "repositioned onto the grid");

        let events = session.drain_events();
        assert!(events.contains(&RaceEvent::FellThroughFloor { car: id }));
    }

    #[test]
    fn test_scatter_powerups_is_seeded() {
        let mut a = session();
        let mut b = session();
        a.scatter_powerups(5);
        b.scatter_powerups(5);

        assert_eq!(a.powerups().len(), 5);
        for (pa, pb) in a.powerups().iter().zip(b.powerups().iter()) {
            assert_eq!(pa, pb);
        }
    }

    #[test]
    fn test_take_powerup_spot() {
        let mut session = session();
        session.scatter_powerups(3);

        let spot = session.powerups()[1];
        let taken = session.take_powerup_spot(spot.id);
        assert_eq!(taken, Some(spot.kind));
        assert_eq!(session.powerups().len(), 2);
        assert_eq!(session.take_powerup_spot(spot.id), None);
    }

    #[test]
    fn test_powerup_expires_during_race() {
        let mut session = session();
        let id = session.add_player();
        session.start_race();

        session.on_powerup_collected(id, PowerupKind::Shield);
        for _ in 0..=POWERUP_DURATION_TICKS {
            session.tick();
        }

        assert!(session.car(id).unwrap().state.powerup.is_none());
        let events = session.drain_events();
        assert!(events.contains(&RaceEvent::PowerupExpired { car: id }));
    }

    #[test]
    fn test_ai_car_moves() {
        let mut session = session();
        let id = session.add_ai(Box::new(GateChaser::new()));
        session.start_race();

        let start = session.car(id).unwrap().state.pos;
        for _ in 0..20 {
            session.tick();
        }
        let end = session.car(id).unwrap().state.pos;
        assert!((end - start).length() > 0.1);
    }

    #[test]
    fn test_player_input_drives_car() {
        let mut session = session();
        let id = session.add_player();
        session.start_race();

        let command = DriveCommand {
            drive: Some(super::super::vehicle::DriveDirection::Forward),
            turn: None,
            drifting: false,
        };
        let start = session.car(id).unwrap().state.pos;
        for _ in 0..10 {
            session.apply_input(id, &command);
            session.tick();
        }
        assert!((session.car(id).unwrap().state.pos - start).length() > 0.0);
    }

    #[test]
    fn test_pause_freezes_the_clock() {
        let mut session = session();
        session.add_player();
        session.start_race();

        session.toggle_pause();
        session.tick();
        assert_eq!(session.time_ticks(), 0);

        session.toggle_pause();
        session.tick();
        assert_eq!(session.time_ticks(), 1);
    }

    #[test]
    fn test_car_ids_are_unique() {
        let mut session = session();
        let a = session.add_player();
        let b = session.add_ai(Box::new(GateChaser::new()));
        let c = session.add_player();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(a.index(), 0);
        assert_eq!(c.index(), 2);
    }
}
