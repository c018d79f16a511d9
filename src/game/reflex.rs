pub const LOWER_BOUND: f64 = 5.0;
pub const UPPER_BOUND: f64 = 95.0;
pub const MIDPOINT: f64 = 50.0;

const START_SPEED: f64 = 5.0;
const SPEED_STEP: f64 = 0.5;
const MAX_SPEED: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// The bar sweeping across the reflex track.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    position: f64,
    direction: Direction,
    speed: f64,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            position: MIDPOINT,
            direction: Direction::Right,
            speed: START_SPEED,
        }
    }
}

impl Marker {
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn tick(&mut self) {
        match self.direction {
            Direction::Right => {
                self.position += self.speed;
                if self.position >= UPPER_BOUND {
                    self.position = UPPER_BOUND;
                    self.direction = Direction::Left;
                }
            }
            Direction::Left => {
                self.position -= self.speed;
                if self.position <= LOWER_BOUND {
                    self.position = LOWER_BOUND;
                    self.direction = Direction::Right;
                }
            }
        }
    }

    /// Scores a strike at the current position and speeds the marker up.
    pub fn strike(&mut self) -> u32 {
        let points = points_at(self.position);
        self.speed = (self.speed + SPEED_STEP).min(MAX_SPEED);
        points
    }
}

/// 10 at the midpoint, one less per 5 units of distance, never below 1.
pub fn points_at(position: f64) -> u32 {
    let distance = (MIDPOINT - position).abs();
    let penalty = (distance / 5.0).floor() as i64;
    (10 - penalty).max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_strike_is_worth_ten() {
        assert_eq!(points_at(50.0), 10);
        assert_eq!(points_at(54.9), 10);
        assert_eq!(points_at(45.1), 10);
    }

    #[test]
    fn every_five_units_costs_a_point() {
        assert_eq!(points_at(55.0), 9);
        assert_eq!(points_at(40.0), 8);
        assert_eq!(points_at(80.0), 4);
        assert_eq!(points_at(95.0), 1);
        assert_eq!(points_at(5.0), 1);
    }

    #[test]
    fn award_is_floored_at_one() {
        assert_eq!(points_at(150.0), 1);
        assert_eq!(points_at(-100.0), 1);
    }

    #[test]
    fn marker_reverses_exactly_at_bounds() {
        let mut marker = Marker::default();
        for _ in 0..9 {
            marker.tick();
        }
        assert_eq!(marker.position(), UPPER_BOUND);
        assert_eq!(marker.direction(), Direction::Left);

        marker.tick();
        assert_eq!(marker.position(), 90.0);
    }

    #[test]
    fn marker_never_leaves_the_track() {
        let mut marker = Marker::default();
        for step in 0..2_000 {
            if step % 7 == 0 {
                marker.strike();
            }
            marker.tick();
            assert!(
                (LOWER_BOUND..=UPPER_BOUND).contains(&marker.position()),
                "escaped at step {step}: {}",
                marker.position()
            );
        }
    }

    #[test]
    fn strikes_speed_up_until_the_cap() {
        let mut marker = Marker::default();
        assert_eq!(marker.strike(), 10);
        assert_eq!(marker.speed(), 5.5);

        for _ in 0..100 {
            marker.strike();
        }
        assert_eq!(marker.speed(), MAX_SPEED);
    }
}
