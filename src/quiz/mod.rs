//! Motor de una sesión de test: orden, corrección, pistas, tiempo y nota.

use thiserror::Error;

pub mod answer;
pub mod hint;
pub mod review;
pub mod session;

pub use answer::{is_correct, normalize};
pub use hint::HintPolicy;
pub use review::{ReviewRow, review};
pub use session::{QuizPrompt, QuizSession, QuizSummary, SubmitOutcome};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("el test no tiene ningún drill disponible")]
    NoDrills,
    #[error("la sesión ya terminó")]
    AlreadyFinished,
}
