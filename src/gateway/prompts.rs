use serde_json::{Value, json};

use crate::telemetry::TelemetryPoint;

pub const ANALYSIS_SAMPLE_LIMIT: usize = 50;

pub const CHAT_SYSTEM_INSTRUCTION: &str = "You are a helpful assistant specializing in the South African K53 driving standard. Answer questions clearly and concisely to help learners pass their tests. Do not answer questions unrelated to driving or the K53 standard.";

pub fn questions_prompt(count: usize) -> String {
    format!(
        "Generate {count} unique multiple-choice questions for the South African K53 learner's license test. \
         Focus on road signs, rules of the road, and vehicle controls. \
         For each question, provide 4 options, the correct answer, and a brief explanation."
    )
}

/// Response schema for question generation, in the model API's schema dialect.
pub fn questions_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "correctAnswer": { "type": "STRING" },
                        "explanation": { "type": "STRING" }
                    },
                    "required": ["question", "options", "correctAnswer", "explanation"]
                }
            }
        },
        "required": ["questions"]
    })
}

pub fn analysis_prompt(telemetry: &[TelemetryPoint]) -> Result<String, serde_json::Error> {
    let sample = &telemetry[..telemetry.len().min(ANALYSIS_SAMPLE_LIMIT)];
    let data = serde_json::to_string(sample)?;
    Ok(format!(
        "You are a K53 driving instructor AI. Analyze the following driving simulator telemetry data.
The data represents a short driving session with timestamps in seconds.
'speed' is in km/h.
'steeringAngle' is in degrees (-180 to 180).
'brake' and 'accelerator' are from 0 (not pressed) to 1 (fully pressed).
Provide constructive feedback based on K53 standards. Look for:
- Harsh braking or acceleration (rapid changes in brake/accelerator values).
- Exceeding a typical urban speed limit of 60 km/h.
- Erratic steering.
- Overall smoothness and control.
Keep the analysis concise and helpful for a learner driver.
Data:
{data}..."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::generator::generate_session;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_analysis_prompt_caps_samples() {
        let telemetry = generate_session(&mut SmallRng::seed_from_u64(1));
        let prompt = analysis_prompt(&telemetry).unwrap();
        assert_eq!(prompt.matches("\"steeringAngle\"").count(), ANALYSIS_SAMPLE_LIMIT);
        assert!(prompt.contains("\"time\":49"));
        assert!(!prompt.contains("\"time\":50"));
        assert!(prompt.contains("60 km/h"));
    }

    #[test]
    fn test_analysis_prompt_short_session() {
        let telemetry = generate_session(&mut SmallRng::seed_from_u64(1));
        let prompt = analysis_prompt(&telemetry[..3]).unwrap();
        assert_eq!(prompt.matches("\"speed\"").count(), 3);
    }

    #[test]
    fn test_questions_prompt_mentions_count() {
        assert!(questions_prompt(10).starts_with("Generate 10 unique"));
    }

    #[test]
    fn test_schema_requires_all_question_fields() {
        let schema = questions_schema();
        let required = &schema["properties"]["questions"]["items"]["required"];
        assert_eq!(required.as_array().map(|a| a.len()), Some(4));
    }
}
