use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::bson_datetime_as_chrono;

/// Attempt document stored in MongoDB "attempts" collection.
///
/// Written twice: once as a `Pending` shell before grading, then finalized
/// with the score. Answers are appended between the two writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub score: u32,
    pub total_questions: u32,
    pub status: AttemptStatus,
    #[serde(rename = "attemptedAt", with = "bson_datetime_as_chrono")]
    pub attempted_at: DateTime<Utc>,
    #[serde(default)]
    pub answers: Vec<UserAnswer>,
}

impl Attempt {
    pub fn shell(user_id: &str, quiz_id: &str, total_questions: u32) -> Self {
        Attempt {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            quiz_id: quiz_id.to_string(),
            score: 0,
            total_questions,
            status: AttemptStatus::Pending,
            attempted_at: Utc::now(),
            answers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    /// Shell written, grading not finished. Stays like this if grading failed.
    Pending,
    Completed,
}

/// One graded answer. Exactly one of `selected_option_ids` / `answer_text`
/// is set, depending on the question type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub id: String,
    pub question_id: String,
    /// Comma-delimited option ids, in submission order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option_ids: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_text: Option<String>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<AnswerEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnswerEntry {
    pub question_id: String,
    #[serde(default)]
    pub selected_option_ids: Option<Vec<String>>,
    #[serde(default)]
    pub answer_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: u32,
    pub total: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttemptResponse {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub score: u32,
    pub total: u32,
    pub status: AttemptStatus,
    pub attempted_at: DateTime<Utc>,
    pub answers: Vec<UserAnswerResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserAnswerResponse {
    pub id: String,
    pub question_id: String,
    pub selected_option_ids: Option<String>,
    pub answer_text: Option<String>,
    pub is_correct: bool,
}

impl From<Attempt> for AttemptResponse {
    fn from(attempt: Attempt) -> Self {
        AttemptResponse {
            id: attempt.id,
            user_id: attempt.user_id,
            quiz_id: attempt.quiz_id,
            score: attempt.score,
            total: attempt.total_questions,
            status: attempt.status,
            attempted_at: attempt.attempted_at,
            answers: attempt
                .answers
                .into_iter()
                .map(|a| UserAnswerResponse {
                    id: a.id,
                    question_id: a.question_id,
                    selected_option_ids: a.selected_option_ids,
                    answer_text: a.answer_text,
                    is_correct: a.is_correct,
                })
                .collect(),
        }
    }
}
