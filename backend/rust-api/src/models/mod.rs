pub mod attempt;
pub mod quiz;
pub mod user;

pub use attempt::{
    AnswerEntry, Attempt, AttemptResponse, AttemptStatus, ScoreResponse, SubmitAnswersRequest,
    UserAnswer,
};
pub use quiz::{Question, QuestionKind, QuestionOption, QuestionType, Quiz, QuizResponse};
pub use user::{Principal, User, UserRole};
