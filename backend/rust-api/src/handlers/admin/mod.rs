//! Quiz and question authoring. Mounted behind the auth middleware and the
//! admin guard.

mod questions;
mod quizzes;

pub use questions::*;
pub use quizzes::*;
