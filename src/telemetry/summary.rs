use crate::telemetry::TelemetryPoint;

pub const URBAN_SPEED_LIMIT: f64 = 60.0;
pub const HARSH_BRAKE_THRESHOLD: f64 = 0.5;

/// Figures shown beside the charts. Computed locally for display only; the
/// analysis request sends raw samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TelemetrySummary {
    pub duration_secs: u32,
    pub peak_speed: f64,
    pub average_speed: f64,
    pub seconds_over_limit: u32,
    pub harsh_brake_seconds: u32,
    pub max_steering: f64,
}

impl TelemetrySummary {
    pub fn from_points(points: &[TelemetryPoint]) -> Self {
        if points.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            duration_secs: points.len() as u32,
            ..Self::default()
        };
        let mut total_speed = 0.0;
        for p in points {
            total_speed += p.speed;
            summary.peak_speed = summary.peak_speed.max(p.speed);
            summary.max_steering = summary.max_steering.max(p.steering_angle.abs());
            if p.speed > URBAN_SPEED_LIMIT {
                summary.seconds_over_limit += 1;
            }
            if p.brake >= HARSH_BRAKE_THRESHOLD {
                summary.harsh_brake_seconds += 1;
            }
        }
        summary.average_speed = total_speed / points.len() as f64;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time: u32, speed: f64, brake: f64, steering_angle: f64) -> TelemetryPoint {
        TelemetryPoint {
            time,
            speed,
            steering_angle,
            brake,
            accelerator: 0.0,
        }
    }

    #[test]
    fn test_empty_session() {
        assert_eq!(TelemetrySummary::from_points(&[]), TelemetrySummary::default());
    }

    #[test]
    fn test_counts() {
        let points = [
            point(0, 10.0, 0.0, 5.0),
            point(1, 65.0, 0.0, -40.0),
            point(2, 70.0, 0.7, 10.0),
            point(3, 20.0, 0.5, 0.0),
        ];
        let s = TelemetrySummary::from_points(&points);
        assert_eq!(s.duration_secs, 4);
        assert_eq!(s.peak_speed, 70.0);
        assert!((s.average_speed - 41.25).abs() < 1e-9);
        assert_eq!(s.seconds_over_limit, 2);
        assert_eq!(s.harsh_brake_seconds, 2);
        assert_eq!(s.max_steering, 40.0);
    }
}
