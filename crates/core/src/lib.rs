#![forbid(unsafe_code)]

pub mod answer;
pub mod model;
pub mod progression;
pub mod scoring;
pub mod time;

pub use time::Clock;

pub use answer::check_answer;
pub use progression::{
    ProgressionStep, is_progression_complete, next_step, required_steps, steps_for,
};
pub use scoring::{ScoreError, SessionScore, TokenPolicy, score_session};
