use std::ops::Range;

use rand::Rng;

use crate::telemetry::TelemetryPoint;

pub const SESSION_SECONDS: u32 = 120;
pub const MAX_SPEED: f64 = 80.0;
pub const MAX_STEERING: f64 = 180.0;

/// Open interval `(lo, hi)` of seconds.
struct Window(Range<u32>);

impl Window {
    const fn open(lo: u32, hi: u32) -> Self {
        Window(lo + 1..hi)
    }

    fn contains(&self, t: u32) -> bool {
        self.0.contains(&t)
    }
}

const PULL_AWAY: Window = Window::open(5, 20);
const HARSH_BRAKE: Window = Window::open(30, 35);
const CRUISE: Window = Window::open(40, 60);
const OVERTAKE: Window = Window::open(80, 90);
const LEFT_BENDS: Window = Window::open(20, 50);
const RIGHT_BENDS: Window = Window::open(70, 100);
const STOP_AFTER: u32 = 110;

/// Build a synthetic two-minute session. The shape is fixed (pull away,
/// harsh brake, cruise, overtake, stop) and the magnitudes are jittered by
/// `rng`. Not a physical model.
pub fn generate_session<R: Rng>(rng: &mut R) -> Vec<TelemetryPoint> {
    let mut points = Vec::with_capacity(SESSION_SECONDS as usize);
    let mut speed: f64 = 0.0;
    let mut steering: f64 = 0.0;

    for t in 0..SESSION_SECONDS {
        let mut accelerator = 0.0;
        let mut brake = 0.0;
        if PULL_AWAY.contains(t) {
            accelerator = rng.r#gen::<f64>() * 0.5 + 0.2;
        }
        if HARSH_BRAKE.contains(t) {
            brake = rng.r#gen::<f64>() * 0.8 + 0.1;
        }
        if CRUISE.contains(t) {
            accelerator = rng.r#gen::<f64>() * 0.4 + 0.1;
        }
        if OVERTAKE.contains(t) {
            accelerator = rng.r#gen::<f64>() * 0.6 + 0.3;
        }
        if t > STOP_AFTER {
            brake = 1.0;
        }

        speed += accelerator * 5.0 - brake * 8.0 - speed * 0.01;
        speed = speed.clamp(0.0, MAX_SPEED);

        let secs = f64::from(t);
        if LEFT_BENDS.contains(t) {
            steering = (secs / 10.0).sin() * 30.0 + (rng.r#gen::<f64>() - 0.5) * 5.0;
        } else if RIGHT_BENDS.contains(t) {
            steering = -(secs / 15.0).sin() * 45.0 + (rng.r#gen::<f64>() - 0.5) * 5.0;
        } else {
            steering *= 0.8;
        }
        steering = steering.clamp(-MAX_STEERING, MAX_STEERING);

        points.push(TelemetryPoint {
            time: t,
            speed: round2(speed),
            steering_angle: round2(steering),
            brake: round2(brake),
            accelerator: round2(accelerator),
        });
    }

    points
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_always_120_points_in_range() {
        for seed in 0..200u64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let points = generate_session(&mut rng);
            assert_eq!(points.len(), 120);
            for (i, p) in points.iter().enumerate() {
                assert_eq!(p.time as usize, i);
                assert!((0.0..=MAX_SPEED).contains(&p.speed), "seed {seed}: speed {}", p.speed);
                assert!(
                    (-MAX_STEERING..=MAX_STEERING).contains(&p.steering_angle),
                    "seed {seed}: steering {}",
                    p.steering_angle
                );
                assert!((0.0..=1.0).contains(&p.brake));
                assert!((0.0..=1.0).contains(&p.accelerator));
            }
        }
    }

    #[test]
    fn test_window_boundaries_are_exclusive() {
        let mut rng = SmallRng::seed_from_u64(7);
        let points = generate_session(&mut rng);
        assert_eq!(points[5].accelerator, 0.0);
        assert!(points[6].accelerator >= 0.2);
        assert!(points[19].accelerator >= 0.2);
        assert_eq!(points[20].accelerator, 0.0);
        assert_eq!(points[30].brake, 0.0);
        assert!(points[31].brake >= 0.1);
        assert_eq!(points[110].brake, 0.0);
        assert_eq!(points[111].brake, 1.0);
    }

    #[test]
    fn test_stops_at_end() {
        let mut rng = SmallRng::seed_from_u64(42);
        let points = generate_session(&mut rng);
        assert_eq!(points.last().map(|p| p.speed), Some(0.0));
        assert_eq!(points[0].speed, 0.0);
    }

    #[test]
    fn test_steering_decays_outside_bends() {
        let mut rng = SmallRng::seed_from_u64(3);
        let points = generate_session(&mut rng);
        // t=50..=70 sits between the two bend windows
        for pair in points[51..70].windows(2) {
            assert!(pair[1].steering_angle.abs() <= pair[0].steering_angle.abs() + 0.01);
        }
    }

    #[test]
    fn test_same_seed_same_session() {
        let a = generate_session(&mut SmallRng::seed_from_u64(11));
        let b = generate_session(&mut SmallRng::seed_from_u64(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_values_rounded_to_two_places() {
        let points = generate_session(&mut SmallRng::seed_from_u64(5));
        for p in &points {
            for v in [p.speed, p.steering_angle, p.brake, p.accelerator] {
                assert!(((v * 100.0).round() - v * 100.0).abs() < 1e-6);
            }
        }
    }
}
