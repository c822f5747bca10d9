use rand::Rng;

use crate::gateway::{AiGateway, GatewayError};
use crate::telemetry::TelemetryPoint;
use crate::telemetry::generator::generate_session;
use crate::telemetry::summary::TelemetrySummary;

pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to get analysis. Please try again.";

/// The simulator screen's state: one generated session and at most one
/// outstanding analysis request for it.
pub struct SimulatorSession {
    telemetry: Vec<TelemetryPoint>,
    summary: TelemetrySummary,
    pub analysis: Option<String>,
    pub error: Option<String>,
    analyzing: bool,
}

impl SimulatorSession {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let telemetry = generate_session(rng);
        let summary = TelemetrySummary::from_points(&telemetry);
        Self {
            telemetry,
            summary,
            analysis: None,
            error: None,
            analyzing: false,
        }
    }

    pub fn telemetry(&self) -> &[TelemetryPoint] {
        &self.telemetry
    }

    pub fn summary(&self) -> &TelemetrySummary {
        &self.summary
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    /// Replace the session. Refused while an analysis is in flight so the
    /// reply always belongs to the telemetry on screen.
    pub fn regenerate<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.analyzing {
            return false;
        }
        *self = Self::new(rng);
        true
    }

    pub fn begin_analysis(&mut self) -> Option<Vec<TelemetryPoint>> {
        if self.analyzing {
            return None;
        }
        self.analyzing = true;
        self.analysis = None;
        self.error = None;
        Some(self.telemetry.clone())
    }

    /// Returns the feedback text when the analysis succeeded.
    pub fn finish_analysis(&mut self, result: Result<String, GatewayError>) -> Option<&str> {
        if !self.analyzing {
            return None;
        }
        self.analyzing = false;
        match result {
            Ok(text) => {
                self.analysis = Some(text);
                self.analysis.as_deref()
            }
            Err(err) => {
                tracing::error!(%err, "session analysis failed");
                self.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
                None
            }
        }
    }

    pub fn analyze(&mut self, gateway: &dyn AiGateway) {
        if let Some(telemetry) = self.begin_analysis() {
            let result = gateway.analyze_session(&telemetry);
            self.finish_analysis(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use crate::gateway::mock::MOCK_ANALYSIS;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn session() -> SimulatorSession {
        SimulatorSession::new(&mut SmallRng::seed_from_u64(9))
    }

    #[test]
    fn test_new_session_has_full_telemetry() {
        let sim = session();
        assert_eq!(sim.telemetry().len(), 120);
        assert_eq!(sim.summary().duration_secs, 120);
        assert!(sim.analysis.is_none());
    }

    #[test]
    fn test_analyze_with_mock() {
        let mut sim = session();
        sim.analyze(&MockGateway);
        assert_eq!(sim.analysis.as_deref(), Some(MOCK_ANALYSIS));
        assert!(!sim.is_analyzing());
    }

    #[test]
    fn test_single_request_in_flight() {
        let mut sim = session();
        assert!(sim.begin_analysis().is_some());
        assert!(sim.begin_analysis().is_none());
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(!sim.regenerate(&mut rng));
        sim.finish_analysis(Err(GatewayError::EmptyResponse));
        assert_eq!(sim.error.as_deref(), Some(ANALYSIS_FAILED_MESSAGE));
        assert!(sim.analysis.is_none());
        assert!(sim.regenerate(&mut rng));
        assert!(sim.error.is_none());
    }

    #[test]
    fn test_new_analysis_clears_previous_text() {
        let mut sim = session();
        sim.analyze(&MockGateway);
        sim.begin_analysis();
        assert!(sim.analysis.is_none());
    }
}
