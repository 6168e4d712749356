//! Error types for evolution runs.

use std::error::Error as StdError;
use std::fmt;
use std::ops::Range;

use netomata_core::{NodeId, TopologyError};
use thiserror::Error;

use crate::rule::RuleId;

/// Result type alias for evolution.
pub type EvolveResult<T> = Result<T, EvolveError>;

/// Result type alias for user hooks.
pub type RuleResult<T> = Result<T, RuleError>;

/// Which user hook raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    ActivityRule,
    Perturbation,
    InputFunction,
    ConnectivityRule,
    UpdateOrder,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Hook::ActivityRule => "activity rule",
            Hook::Perturbation => "perturbation",
            Hook::InputFunction => "input function",
            Hook::ConnectivityRule => "connectivity rule",
            Hook::UpdateOrder => "update order",
        };
        f.write_str(name)
    }
}

/// Failure raised by a user-supplied hook.
///
/// Wraps whatever error the hook produced; the engine never inspects or
/// rewrites it, so callers can recover the original with
/// [`RuleError::downcast_ref`].
#[derive(Debug)]
pub struct RuleError {
    inner: Box<dyn StdError + Send + Sync + 'static>,
}

impl RuleError {
    /// Wrap an arbitrary error.
    pub fn new(error: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self {
            inner: error.into(),
        }
    }

    /// Build from a plain message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::new(message.to_string())
    }

    /// Borrow the wrapped error as a concrete type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Unwrap into the boxed error.
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.inner
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for RuleError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

impl From<TopologyError> for RuleError {
    fn from(err: TopologyError) -> Self {
        Self::new(err)
    }
}

impl From<String> for RuleError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for RuleError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Reading a history entry that is not available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// The entry existed but was dropped by compression.
    #[error("timestep {timestep} was evicted; retained range is {retained:?}")]
    Evicted {
        timestep: usize,
        retained: Range<usize>,
    },

    /// The run never reached this timestep.
    #[error("timestep {timestep} is beyond the history length {len}")]
    OutOfRange { timestep: usize, len: usize },
}

/// Errors that can occur while configuring or running an evolution.
#[derive(Debug, Error)]
pub enum EvolveError {
    /// Inputs are inconsistent with each other; raised before any step runs
    /// unless a hook produces an inconsistent result mid-run.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The activity rule needs more past condition vectors than were supplied.
    #[error("rule {rule} needs {required} past condition vector(s), {supplied} supplied")]
    MissingPastConditions {
        rule: RuleId,
        required: usize,
        supplied: usize,
    },

    /// A user hook failed; the run stops and the hook's error is preserved.
    #[error("{hook} failed at timestep {timestep}")]
    RuleEvaluation {
        hook: Hook,
        node: Option<NodeId>,
        timestep: usize,
        #[source]
        source: RuleError,
    },

    /// Topology construction or conversion failed.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EvolveError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn hook(hook: Hook, node: Option<NodeId>, timestep: usize, source: RuleError) -> Self {
        Self::RuleEvaluation {
            hook,
            node,
            timestep,
            source,
        }
    }

    /// The hook error behind a [`EvolveError::RuleEvaluation`], if any.
    pub fn rule_error(&self) -> Option<&RuleError> {
        match self {
            Self::RuleEvaluation { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error, PartialEq)]
    #[error("tape ran out")]
    struct TapeExhausted;

    #[test]
    fn test_rule_error_keeps_original_type() {
        let err = EvolveError::hook(
            Hook::ActivityRule,
            Some(NodeId(4)),
            7,
            RuleError::new(TapeExhausted),
        );
        assert_eq!(err.to_string(), "activity rule failed at timestep 7");
        let original = err.rule_error().and_then(|e| e.downcast_ref::<TapeExhausted>());
        assert_eq!(original, Some(&TapeExhausted));
    }

    #[test]
    fn test_hook_failure_names_its_cause_once() {
        let err = EvolveError::hook(
            Hook::ConnectivityRule,
            None,
            2,
            RuleError::msg("graph fell apart"),
        );
        let cause = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(cause.as_deref(), Some("graph fell apart"));
        assert!(!err.to_string().contains("graph fell apart"));

        let chain = anyhow::Error::new(err).context("run failed");
        let rendered = format!("{chain:?}");
        assert_eq!(rendered.matches("graph fell apart").count(), 1, "{rendered}");
    }

    #[test]
    fn test_evicted_message_names_range() {
        let err = HistoryError::Evicted {
            timestep: 1,
            retained: 8..10,
        };
        assert_eq!(
            err.to_string(),
            "timestep 1 was evicted; retained range is 8..10"
        );
    }
}
