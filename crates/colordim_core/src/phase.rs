//! Training phases.

use serde::{Deserialize, Serialize};

/// Phase a batch belongs to. Each phase is accumulated independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Training batches (gradients flow, batch counter advances).
    #[default]
    Train,
    /// Validation batches.
    Valid,
}

impl Phase {
    /// Whether this is the training phase.
    #[must_use]
    pub const fn is_train(self) -> bool {
        matches!(self, Phase::Train)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Train => write!(f, "train"),
            Phase::Valid => write!(f, "valid"),
        }
    }
}
