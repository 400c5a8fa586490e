use thiserror::Error;

use super::screen::Screen;
use crate::{records::RecordError, timer::TimerError};

/// Programming errors of the navigation layer. None of these is reachable
/// from correct presentation code; when one occurs the session context is
/// left exactly as it was.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("event `{event}` is not accepted on screen `{screen}`")]
    Rejected { screen: Screen, event: &'static str },
    #[error("`{event}` on `{screen}` requires {missing}")]
    MissingPrerequisite {
        screen: Screen,
        event: &'static str,
        missing: &'static str,
    },
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Record(#[from] RecordError),
}
