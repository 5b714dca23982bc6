//! Grading of a single submitted answer against a question's answer data.
//!
//! Grading itself is pure; persisting the result is up to the caller.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{QuizError, QuizResult};
use crate::models::{AnswerEntry, Question, QuestionKind, QuestionOption, UserAnswer};

/// Longest accepted free-text answer, in characters.
pub const MAX_TEXT_ANSWER_CHARS: usize = 300;

/// Separator used when storing selected option ids as a single string.
pub const OPTION_ID_DELIMITER: &str = ",";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredAnswer {
    /// Selected option ids joined with [`OPTION_ID_DELIMITER`]
    Choice(String),
    /// Raw submitted text
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub is_correct: bool,
    pub stored: StoredAnswer,
}

impl GradedAnswer {
    pub fn into_user_answer(self, question_id: &str) -> UserAnswer {
        let (selected_option_ids, answer_text) = match self.stored {
            StoredAnswer::Choice(ids) => (Some(ids), None),
            StoredAnswer::Text(text) => (None, Some(text)),
        };
        UserAnswer {
            id: Uuid::new_v4().to_string(),
            question_id: question_id.to_string(),
            selected_option_ids,
            answer_text,
            is_correct: self.is_correct,
        }
    }
}

/// Grades one entry. The question's kind picks the grading rule.
pub fn grade(question: &Question, entry: &AnswerEntry) -> QuizResult<GradedAnswer> {
    match &question.kind {
        QuestionKind::Text { correct_answer } => {
            grade_text(correct_answer, entry.answer_text.as_deref())
        }
        QuestionKind::SingleChoice { options } => {
            grade_single_choice(options, entry.selected_option_ids.as_deref())
        }
        QuestionKind::MultipleChoice { options } => {
            grade_multiple_choice(options, entry.selected_option_ids.as_deref())
        }
    }
}

fn grade_text(correct_answer: &str, submitted: Option<&str>) -> QuizResult<GradedAnswer> {
    let text = submitted.ok_or_else(|| {
        QuizError::InvalidAnswer("Text answer is required for text questions".to_string())
    })?;

    if text.chars().count() > MAX_TEXT_ANSWER_CHARS {
        return Err(QuizError::InvalidAnswer(format!(
            "Text answer must be at most {} characters",
            MAX_TEXT_ANSWER_CHARS
        )));
    }

    Ok(GradedAnswer {
        is_correct: text.to_lowercase() == correct_answer.to_lowercase(),
        stored: StoredAnswer::Text(text.to_string()),
    })
}

fn grade_single_choice(
    options: &[QuestionOption],
    submitted: Option<&[String]>,
) -> QuizResult<GradedAnswer> {
    let selected = selected_ids(submitted)?;
    if selected.len() != 1 {
        return Err(QuizError::InvalidAnswer(
            "Single choice allows only one selection".to_string(),
        ));
    }
    Ok(grade_choice(options, selected))
}

fn grade_multiple_choice(
    options: &[QuestionOption],
    submitted: Option<&[String]>,
) -> QuizResult<GradedAnswer> {
    let selected = selected_ids(submitted)?;
    Ok(grade_choice(options, selected))
}

/// Non-empty, deduplicated selection in submission order.
fn selected_ids(submitted: Option<&[String]>) -> QuizResult<Vec<&str>> {
    let ids = submitted.unwrap_or_default();
    if ids.is_empty() {
        return Err(QuizError::InvalidAnswer(
            "Options required for choice questions".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(ids.len());
    Ok(ids
        .iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect())
}

fn grade_choice(options: &[QuestionOption], selected: Vec<&str>) -> GradedAnswer {
    let correct: HashSet<&str> = options
        .iter()
        .filter(|o| o.is_correct)
        .map(|o| o.id.as_str())
        .collect();
    let chosen: HashSet<&str> = selected.iter().copied().collect();

    GradedAnswer {
        is_correct: chosen == correct,
        stored: StoredAnswer::Choice(selected.join(OPTION_ID_DELIMITER)),
    }
}
