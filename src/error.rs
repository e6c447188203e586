//! Errors raised while decoding resources handed to the event manager.
//!
//! The dispatch core itself never fails; see the crate docs.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error("resource truncated: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },
    #[error("palette range {start}..={end} is invalid")]
    InvalidRange { start: usize, end: usize },
    #[error("color map has {got} colors, range needs {needed}")]
    MissingColors { needed: usize, got: usize },
    #[error("unknown cycle type {0} in slot {1}")]
    UnknownCycleType(u8, usize),
    #[error("cycle sequence in slot {0} is empty")]
    EmptySequence(usize),
    #[error("bitmap of {width}x{height} needs {needed} bytes, got {got}")]
    BitmapSize {
        width: u16,
        height: u16,
        needed: usize,
        got: usize,
    },
}
