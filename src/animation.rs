//! Time-based animations for the chairs and the door.
//!
//! Every animated quantity is a [`BoundedAnimation`]: a scalar that moves toward one
//! of its two bounds at a fixed rate, scaled by the wall-clock time since its own
//! previous tick. Animations never share a timestamp, so starting one never
//! distorts the step of another already in flight.
//!
//! The application ticks every animation once per frame. An animation that is
//! still moving reports [`TickOutcome::Reschedule`]; once it reaches its bound it
//! goes [`AnimationState::Idle`] and further ticks are no-ops.

use crate::layout::{self, CHAIR_COUNT, ChairId};
use std::time::Instant;

/// How far a chair slides out from under its table, in meters.
pub const CHAIR_TRAVEL: f32 = 0.6;
/// Chair speed: a full slide takes one second.
pub const CHAIR_RATE_PER_MS: f32 = CHAIR_TRAVEL / 1000.0;

/// Fully open door angle, in degrees.
pub const DOOR_OPEN_DEGREES: f32 = 100.0;
/// Door speed: a full swing takes one second.
pub const DOOR_RATE_PER_MS: f32 = DOOR_OPEN_DEGREES / 1000.0;
/// Distance from the trigger point inside which the door opens.
pub const DOOR_TRIGGER_RADIUS: f32 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Increase => 1.0,
            Direction::Decrease => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationState {
    Idle,
    Animating { direction: Direction, last_tick: Instant },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still moving; tick again next frame.
    Reschedule,
    /// At rest on a bound (or was never moving).
    Settled,
}

/// A scalar confined to `[lower, upper]` that animates toward either bound.
#[derive(Clone, Debug)]
pub struct BoundedAnimation {
    value: f32,
    lower: f32,
    upper: f32,
    rate_per_ms: f32,
    state: AnimationState,
}

impl BoundedAnimation {
    pub fn new(value: f32, lower: f32, upper: f32, rate_per_ms: f32) -> Self {
        Self {
            value: value.clamp(lower, upper),
            lower,
            upper,
            rate_per_ms,
            state: AnimationState::Idle,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, AnimationState::Animating { .. })
    }

    fn target(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Increase => self.upper,
            Direction::Decrease => self.lower,
        }
    }

    /// Begins moving toward the bound named by `direction`, timing from `now`.
    ///
    /// Replaces any animation already in progress. If the value already sits on
    /// that bound the animation stays idle.
    pub fn start(&mut self, direction: Direction, now: Instant) {
        self.state = if self.value == self.target(direction) {
            AnimationState::Idle
        } else {
            AnimationState::Animating {
                direction,
                last_tick: now,
            }
        };
    }

    /// Advances by the time elapsed since the previous tick.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let AnimationState::Animating {
            direction,
            last_tick,
        } = self.state
        else {
            return TickOutcome::Settled;
        };

        let elapsed_ms = now.saturating_duration_since(last_tick).as_secs_f32() * 1000.0;
        let target = self.target(direction);
        let moved = self.value + direction.sign() * self.rate_per_ms * elapsed_ms;
        self.value = match direction {
            Direction::Increase => moved.min(target),
            Direction::Decrease => moved.max(target),
        };

        if self.value == target {
            self.state = AnimationState::Idle;
            TickOutcome::Settled
        } else {
            self.state = AnimationState::Animating {
                direction,
                last_tick: now,
            };
            TickOutcome::Reschedule
        }
    }
}

/// One tuck animation per chair. Offsets run from `-CHAIR_TRAVEL` (pulled out)
/// to `0` (tucked in).
#[derive(Clone, Debug)]
pub struct ChairAnimations {
    chairs: [BoundedAnimation; CHAIR_COUNT],
}

impl Default for ChairAnimations {
    fn default() -> Self {
        Self {
            chairs: std::array::from_fn(|_| {
                BoundedAnimation::new(0.0, -CHAIR_TRAVEL, 0.0, CHAIR_RATE_PER_MS)
            }),
        }
    }
}

impl ChairAnimations {
    pub fn offset(&self, chair: ChairId) -> f32 {
        self.chairs[chair.index()].value()
    }

    /// Tucks the chair in if it is fully out, otherwise pulls it out.
    ///
    /// A chair caught mid-slide is pulled back out.
    pub fn toggle(&mut self, chair: ChairId, now: Instant) {
        let animation = &mut self.chairs[chair.index()];
        let direction = if animation.value() == -CHAIR_TRAVEL {
            Direction::Increase
        } else {
            Direction::Decrease
        };
        log::debug!("{chair}: sliding {direction:?} from {:.2}", animation.value());
        animation.start(direction, now);
    }

    /// Ticks every chair; returns how many are still moving.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut moving = 0;
        for (index, animation) in self.chairs.iter_mut().enumerate() {
            if !animation.is_animating() {
                continue;
            }
            match animation.tick(now) {
                TickOutcome::Reschedule => moving += 1,
                TickOutcome::Settled => {
                    log::debug!("chair #{index}: settled at {:.2}", animation.value())
                }
            }
        }
        moving
    }

    pub fn any_animating(&self) -> bool {
        self.chairs.iter().any(BoundedAnimation::is_animating)
    }
}

/// Opens the door while the camera is near it and closes it once it leaves.
#[derive(Clone, Debug)]
pub struct DoorController {
    swing: BoundedAnimation,
    in_range: bool,
}

impl Default for DoorController {
    fn default() -> Self {
        Self {
            swing: BoundedAnimation::new(0.0, 0.0, DOOR_OPEN_DEGREES, DOOR_RATE_PER_MS),
            in_range: false,
        }
    }
}

impl DoorController {
    /// Current swing angle in degrees (0 is shut).
    pub fn angle(&self) -> f32 {
        self.swing.value()
    }

    pub fn in_range(&self) -> bool {
        self.in_range
    }

    pub fn is_animating(&self) -> bool {
        self.swing.is_animating()
    }

    /// Checks the camera's floor position against the trigger radius.
    ///
    /// Starts opening on entry and closing on exit; returns the direction started,
    /// if any. Staying on the same side of the boundary does nothing.
    pub fn update_proximity(&mut self, camera_x: f32, camera_z: f32, now: Instant) -> Option<Direction> {
        let (door_x, door_z) = layout::door_trigger_point();
        let dist_sq = (door_x - camera_x).powi(2) + (door_z - camera_z).powi(2);
        let radius_sq = DOOR_TRIGGER_RADIUS * DOOR_TRIGGER_RADIUS;

        let direction = if dist_sq < radius_sq && !self.in_range {
            self.in_range = true;
            Direction::Increase
        } else if dist_sq > radius_sq && self.in_range {
            self.in_range = false;
            Direction::Decrease
        } else {
            return None;
        };

        log::debug!("door: swinging {direction:?} from {:.1}°", self.angle());
        self.swing.start(direction, now);
        Some(direction)
    }

    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let was_animating = self.swing.is_animating();
        let outcome = self.swing.tick(now);
        if was_animating && outcome == TickOutcome::Settled {
            log::debug!("door: settled at {:.1}°", self.angle());
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn tick_while_idle_is_a_noop() {
        let mut anim = BoundedAnimation::new(0.5, 0.0, 1.0, 0.001);
        assert_eq!(anim.tick(Instant::now()), TickOutcome::Settled);
        assert_eq!(anim.value(), 0.5);
    }

    #[test]
    fn animation_reaches_bound_and_settles() {
        let t0 = Instant::now();
        let mut anim = BoundedAnimation::new(0.0, 0.0, 1.0, 0.001);
        anim.start(Direction::Increase, t0);
        assert_eq!(anim.tick(t0 + ms(400)), TickOutcome::Reschedule);
        assert_relative_eq!(anim.value(), 0.4, epsilon = 1e-4);
        assert_eq!(anim.tick(t0 + ms(1500)), TickOutcome::Settled);
        assert_eq!(anim.value(), 1.0);
        assert_eq!(anim.state(), AnimationState::Idle);
    }

    #[test]
    fn start_at_bound_stays_idle() {
        let mut anim = BoundedAnimation::new(1.0, 0.0, 1.0, 0.001);
        anim.start(Direction::Increase, Instant::now());
        assert!(!anim.is_animating());
    }

    #[test]
    fn chair_toggle_pulls_out_then_tucks_in() {
        let t0 = Instant::now();
        let chair = ChairId::new(4).unwrap();
        let mut chairs = ChairAnimations::default();

        chairs.toggle(chair, t0);
        assert_eq!(chairs.tick(t0 + ms(500)), 1);
        assert_relative_eq!(chairs.offset(chair), -0.3, epsilon = 1e-4);
        assert_eq!(chairs.tick(t0 + ms(1200)), 0);
        assert_eq!(chairs.offset(chair), -CHAIR_TRAVEL);

        let t1 = t0 + ms(2000);
        chairs.toggle(chair, t1);
        assert_eq!(chairs.tick(t1 + ms(1000)), 0);
        assert_eq!(chairs.offset(chair), 0.0);
    }

    #[test]
    fn chairs_keep_their_own_timestamps() {
        let t0 = Instant::now();
        let a = ChairId::new(0).unwrap();
        let b = ChairId::new(1).unwrap();
        let mut chairs = ChairAnimations::default();

        chairs.toggle(a, t0);
        chairs.tick(t0 + ms(500));
        chairs.toggle(b, t0 + ms(500));
        chairs.tick(t0 + ms(750));

        assert_relative_eq!(chairs.offset(a), -0.45, epsilon = 1e-4);
        assert_relative_eq!(chairs.offset(b), -0.15, epsilon = 1e-4);
    }

    #[test]
    fn door_opens_within_a_second_then_settles() {
        let t0 = Instant::now();
        let (x, z) = layout::door_trigger_point();
        let mut door = DoorController::default();

        assert_eq!(door.update_proximity(x - 0.5, z, t0), Some(Direction::Increase));
        let mut now = t0;
        let mut ticks = 0;
        while door.tick(now + ms(16)) == TickOutcome::Reschedule {
            now += ms(16);
            ticks += 1;
            assert!(ticks < 100, "door never settled");
        }
        assert_eq!(door.angle(), DOOR_OPEN_DEGREES);
        assert!(ticks <= 63);

        // staying in range does not restart anything
        assert_eq!(door.update_proximity(x - 0.4, z, now), None);
        assert!(!door.is_animating());
    }

    #[test]
    fn door_closes_on_exit_from_current_angle() {
        let t0 = Instant::now();
        let (x, z) = layout::door_trigger_point();
        let mut door = DoorController::default();

        door.update_proximity(x - 0.5, z, t0);
        door.tick(t0 + ms(300));
        assert_relative_eq!(door.angle(), 30.0, epsilon = 1e-3);

        let t1 = t0 + ms(300);
        assert_eq!(door.update_proximity(x - 2.0, z, t1), Some(Direction::Decrease));
        door.tick(t1 + ms(100));
        assert_relative_eq!(door.angle(), 20.0, epsilon = 1e-3);
        door.tick(t1 + ms(1000));
        assert_eq!(door.angle(), 0.0);
    }

    #[test]
    fn door_far_away_stays_shut() {
        let mut door = DoorController::default();
        assert_eq!(door.update_proximity(2.4, 0.1, Instant::now()), None);
        assert_eq!(door.angle(), 0.0);
    }

    proptest! {
        #[test]
        fn value_is_bounded_and_monotone(
            steps in prop::collection::vec(0u64..400, 1..40),
            increase in any::<bool>(),
            start in -0.6f32..=0.0,
        ) {
            let direction = if increase { Direction::Increase } else { Direction::Decrease };
            let mut anim = BoundedAnimation::new(start, -CHAIR_TRAVEL, 0.0, CHAIR_RATE_PER_MS);
            let mut now = Instant::now();
            anim.start(direction, now);
            let mut previous = anim.value();
            for step in steps {
                now += ms(step);
                anim.tick(now);
                let value = anim.value();
                prop_assert!((-CHAIR_TRAVEL..=0.0).contains(&value));
                prop_assert!(direction.sign() * (value - previous) >= 0.0);
                previous = value;
            }
        }

        #[test]
        fn door_stays_within_its_swing_while_walked_past(
            walk in prop::collection::vec((any::<bool>(), 0u64..300), 1..200),
        ) {
            let (x, z) = layout::door_trigger_point();
            let mut door = DoorController::default();
            let mut now = Instant::now();
            let mut previous = door.angle();
            for (inside, step) in walk {
                let camera_x = if inside { x - 0.5 } else { x - 3.0 };
                let started = door.update_proximity(camera_x, z, now);
                prop_assert_eq!(door.in_range(), inside);
                now += ms(step);
                door.tick(now);
                let angle = door.angle();
                prop_assert!((0.0..=DOOR_OPEN_DEGREES).contains(&angle));
                // between boundary crossings the door only moves the way it was sent
                if started.is_none() {
                    let sign = if inside { 1.0 } else { -1.0 };
                    prop_assert!(sign * (angle - previous) >= 0.0);
                }
                previous = angle;
            }
        }

        #[test]
        fn settle_is_idempotent(extra in 0u64..5_000) {
            let t0 = Instant::now();
            let mut anim = BoundedAnimation::new(0.0, 0.0, DOOR_OPEN_DEGREES, DOOR_RATE_PER_MS);
            anim.start(Direction::Increase, t0);
            prop_assert_eq!(anim.tick(t0 + ms(1000)), TickOutcome::Settled);
            prop_assert_eq!(anim.tick(t0 + ms(1000 + extra)), TickOutcome::Settled);
            prop_assert_eq!(anim.value(), DOOR_OPEN_DEGREES);
            anim.start(Direction::Increase, t0 + ms(1000 + extra));
            prop_assert!(!anim.is_animating());
        }
    }
}
