// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Error Types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PatrolError>;

/// Errors raised by the patrol model. Every failure is reported at the
/// point of the invalid call and leaves no partial state behind.
#[derive(Debug, Error)]
pub enum PatrolError {
    /// Profile sets, fines, gaps, pool sizes or costs that cannot describe a
    /// valid enforcement setup.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Out-of-range argument to a scheduling or estimation routine.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Monte Carlo estimation was asked to run with zero samples.
    #[error("estimation degenerate: monte carlo sample count is zero")]
    EstimationDegenerate,

    /// A ticket was requested while the cop at the head of the queue is busy.
    #[error("cop {cop_id} is busy for another {minutes_until_available:.2} min")]
    CopBusy {
        cop_id: u32,
        minutes_until_available: f64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration text could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
}

impl PatrolError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub(crate) fn param(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
