//! Application errors
//! Every failure the view controller turns into an on-screen message.

use crate::charts::{RenderError, SurfaceError};
use crate::data::{ParseError, ReadError};
use crate::stats::StatsError;
use thiserror::Error;

/// Failures surfaced to the user by the view controller.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Read(#[from] ReadError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Stats(#[from] StatsError),

    #[error("{0}")]
    Surface(#[from] SurfaceError),

    #[error("Export failed: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid savings goal: {0}")]
    InvalidGoal(f64),
}
