use crate::quiz_service::QuizOutcome;

/// Totals for one sitting of questions
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub total_questions: i32,
    pub correct_answers: i32,
    pub incorrect_answers: i32,
    pub accuracy_percentage: f64,
    /// Mean distance of map taps in meters, if any were made
    pub average_distance_m: Option<f64>,
}

impl SessionSummary {
    pub fn from_outcomes(outcomes: &[QuizOutcome]) -> Self {
        let total_questions = outcomes.len() as i32;
        let correct_answers = outcomes.iter().filter(|o| o.success).count() as i32;
        let incorrect_answers = total_questions - correct_answers;
        let accuracy_percentage = if total_questions > 0 {
            (correct_answers as f64 / total_questions as f64) * 100.0
        } else {
            0.0
        };

        let distances: Vec<f64> = outcomes.iter().filter_map(|o| o.distance).collect();
        let average_distance_m = if distances.is_empty() {
            None
        } else {
            Some(distances.iter().sum::<f64>() / distances.len() as f64)
        };

        SessionSummary {
            total_questions,
            correct_answers,
            incorrect_answers,
            accuracy_percentage,
            average_distance_m,
        }
    }
}
