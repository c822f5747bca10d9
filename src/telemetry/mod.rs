pub mod generator;
pub mod summary;

use serde::{Deserialize, Serialize};

/// One second of simulated driving. Serialized with camelCase keys because
/// the analysis prompt embeds the samples verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryPoint {
    pub time: u32,
    /// km/h
    pub speed: f64,
    /// degrees, negative is left
    pub steering_angle: f64,
    pub brake: f64,
    pub accelerator: f64,
}
