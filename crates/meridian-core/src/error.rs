//! Fatal error conditions for the simulation core.
//!
//! Every condition the original implementation treated as an `assert()` is
//! modeled here as a variant instead. Callers that hit one of these are
//! expected to propagate it to the top level and abort the run — see
//! spec §7 for the full list of fatal conditions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeridianError {
    #[error("{component}: event scheduled at {attempted:?} is not after current time {now:?}")]
    CausalityViolation {
        component: String,
        now: crate::time::VTime,
        attempted: crate::time::VTime,
    },

    #[error("{component}: credit count would go negative on vc {vc_idx}")]
    NegativeCredit { component: String, vc_idx: u32 },

    #[error("{component}: vc {vc_idx} granted twice in the same cycle")]
    DoubleGrant { component: String, vc_idx: u32 },

    #[error("{component}: received flit for message {expected} while reassembling {actual}")]
    ReassemblyMismatch {
        component: String,
        expected: u64,
        actual: u64,
    },

    #[error("{component}: unknown factory key '{key}'")]
    UnknownFactoryKey { component: String, key: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{component}: {message}")]
    Invariant { component: String, message: String },
}

pub type Result<T> = std::result::Result<T, MeridianError>;
