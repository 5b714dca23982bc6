use uuid::Uuid;

use crate::error::{QuizError, QuizResult};
use crate::models::quiz::{OptionRequest, QuestionRequest};
use crate::models::{QuestionKind, QuestionOption, QuestionType};

/// Checks authoring-time invariants and builds the stored question kind.
/// Options receive fresh ids; data irrelevant to the type is dropped.
pub fn validate_question(req: &QuestionRequest) -> QuizResult<QuestionKind> {
    match req.question_type {
        QuestionType::SingleChoice | QuestionType::MultipleChoice => {
            let options = req
                .options
                .as_deref()
                .filter(|opts| !opts.is_empty())
                .ok_or_else(|| {
                    QuizError::InvalidQuestion("Options required for choice questions".to_string())
                })?;

            if options.iter().any(|o| o.text.trim().is_empty()) {
                return Err(QuizError::InvalidQuestion(
                    "Option text must not be blank".to_string(),
                ));
            }

            let correct_count = options.iter().filter(|o| o.is_correct).count();
            tracing::debug!(
                "Question type: {}, correct option count: {}",
                req.question_type,
                correct_count
            );

            if req.question_type == QuestionType::SingleChoice {
                if correct_count != 1 {
                    return Err(QuizError::InvalidQuestion(
                        "Single choice must have exactly one correct option".to_string(),
                    ));
                }
                Ok(QuestionKind::SingleChoice {
                    options: build_options(options),
                })
            } else {
                if correct_count < 1 {
                    return Err(QuizError::InvalidQuestion(
                        "Multiple choice must have at least one correct option".to_string(),
                    ));
                }
                Ok(QuestionKind::MultipleChoice {
                    options: build_options(options),
                })
            }
        }
        QuestionType::Text => {
            let correct_answer = req
                .correct_answer_text
                .as_deref()
                .filter(|text| !text.trim().is_empty())
                .ok_or_else(|| {
                    QuizError::InvalidQuestion(
                        "Correct answer text required for text questions".to_string(),
                    )
                })?;

            Ok(QuestionKind::Text {
                correct_answer: correct_answer.to_string(),
            })
        }
    }
}

fn build_options(options: &[OptionRequest]) -> Vec<QuestionOption> {
    options
        .iter()
        .map(|o| QuestionOption {
            id: Uuid::new_v4().to_string(),
            text: o.text.clone(),
            is_correct: o.is_correct,
        })
        .collect()
}
