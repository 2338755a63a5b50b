//! csgf-quiz: the chat arithmetic quiz.
//!
//! A participant transfers funds to the local account; the account posts a
//! random arithmetic expression to the chat and pays the first participant
//! who answers it correctly, keeping a commission. One quiz round runs at a
//! time; further transfers queue in arrival order.

pub mod advert;
pub mod expression;
pub mod scheduler;

pub use advert::{spawn_advert_ticker, ADVERT_TEXT};
pub use expression::{evaluate, generate, ExprError, Expression};
pub use scheduler::{payout, MathQuiz, MiniGameRound, Outbound, QuizState};
