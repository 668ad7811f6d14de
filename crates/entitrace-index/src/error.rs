//! Index invariant violations

use thiserror::Error;

use crate::hash::ReadTraceHash;

/// Reported by [`ReadTraceIndex::check_consistency`](crate::ReadTraceIndex::check_consistency).
///
/// Normal index operations never fail; these only surface when the two
/// directions of the index have diverged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Consumer {consumer} and trace {trace:#018x} are registered in only one direction")]
    Asymmetric {
        consumer: String,
        trace: ReadTraceHash,
    },

    #[error("Trace {trace:#018x} maps to an empty consumer set")]
    EmptyConsumerSet { trace: ReadTraceHash },

    #[error("Consumer {consumer} is stored with an empty trace set")]
    EmptyTraceSet { consumer: String },
}

impl IndexError {
    pub fn asymmetric(consumer: impl Into<String>, trace: ReadTraceHash) -> Self {
        Self::Asymmetric {
            consumer: consumer.into(),
            trace,
        }
    }

    pub fn empty_trace_set(consumer: impl Into<String>) -> Self {
        Self::EmptyTraceSet {
            consumer: consumer.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
