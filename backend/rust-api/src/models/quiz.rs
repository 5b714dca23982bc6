use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::user::bson_datetime_as_chrono;

/// Quiz document stored in MongoDB "quizzes" collection.
///
/// The quiz owns its questions, and each question owns its options; they are
/// embedded rather than referenced. Soft deletes only flip `active`, so ids
/// already recorded in attempts keep pointing at real data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    /// User id of the admin who authored the quiz
    pub created_by: String,
    pub active: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(rename = "createdAt", with = "bson_datetime_as_chrono")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "bson_datetime_as_chrono")]
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    /// Questions a new attempt is graded against.
    pub fn active_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.active)
    }

    /// Copy of the quiz with soft-deleted questions removed.
    pub fn with_active_questions(mut self) -> Self {
        self.questions.retain(|q| q.active);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub active: bool,
    pub kind: QuestionKind,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }
}

/// Answer data of a question. The tag decides whether options or a correct
/// text exist; the other one is not representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    SingleChoice { options: Vec<QuestionOption> },
    MultipleChoice { options: Vec<QuestionOption> },
    Text { correct_answer: String },
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::SingleChoice { .. } => QuestionType::SingleChoice,
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::Text { .. } => QuestionType::Text,
        }
    }

    pub fn options(&self) -> &[QuestionOption] {
        match self {
            QuestionKind::SingleChoice { options } | QuestionKind::MultipleChoice { options } => {
                options
            }
            QuestionKind::Text { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    Text,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "SINGLE_CHOICE",
            QuestionType::MultipleChoice => "MULTIPLE_CHOICE",
            QuestionType::Text => "TEXT",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to create a quiz
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(
        length(
            min = 1,
            max = 200,
            message = "Title must be between 1 and 200 characters"
        ),
        custom(function = "not_blank", message = "Title must not be blank")
    )]
    pub title: String,
}

/// Request to rename a quiz
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(
        length(
            min = 1,
            max = 200,
            message = "Title must be between 1 and 200 characters"
        ),
        custom(function = "not_blank", message = "Title must not be blank")
    )]
    pub title: String,
}

/// Request to add or replace a question. `options` is used by the choice
/// types, `correct_answer_text` by TEXT.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionRequest {
    #[validate(
        length(min = 1, max = 1000, message = "Question text is required"),
        custom(function = "not_blank", message = "Question text is required")
    )]
    pub text: String,

    #[serde(rename = "type")]
    pub question_type: QuestionType,

    #[serde(default)]
    pub options: Option<Vec<OptionRequest>>,

    #[serde(default)]
    pub correct_answer_text: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionRequest {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// Quiz as shown to candidates: active questions only, no correctness data.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuizResponse {
    pub id: String,
    pub title: String,
    pub questions: Vec<QuestionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<OptionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptionResponse {
    pub id: String,
    pub text: String,
}

impl From<Quiz> for QuizResponse {
    fn from(quiz: Quiz) -> Self {
        let questions = quiz
            .active_questions()
            .map(|q| QuestionResponse {
                id: q.id.clone(),
                text: q.text.clone(),
                question_type: q.question_type(),
                options: q
                    .kind
                    .options()
                    .iter()
                    .map(|o| OptionResponse {
                        id: o.id.clone(),
                        text: o.text.clone(),
                    })
                    .collect(),
            })
            .collect();

        QuizResponse {
            id: quiz.id,
            title: quiz.title,
            questions,
        }
    }
}
