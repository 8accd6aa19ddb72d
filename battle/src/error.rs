//! Error types for battle setup.
//!
//! Setup validation is the only fallible surface; once a battle starts, the
//! engine never fails, it only produces a `Results`.

use std::fmt;

/// Structural problems with a deck or configuration, detected before the
/// first turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The deck's commander slot does not hold a commander card.
    InvalidCommander { card_id: u32 },
    /// A commander card appears in the drawable card sequence.
    CommanderInDeck { card_id: u32 },
    /// A fortress slot holds a card that is not a structure.
    InvalidFort { card_id: u32 },
    /// A quest descriptor with a zero target value.
    InvalidQuest,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidCommander { card_id } => {
                write!(f, "card #{card_id} cannot lead a deck: not a commander")
            }
            SimError::CommanderInDeck { card_id } => {
                write!(f, "commander card #{card_id} cannot be drawn from a deck")
            }
            SimError::InvalidFort { card_id } => {
                write!(f, "card #{card_id} cannot be a fortress: not a structure")
            }
            SimError::InvalidQuest => write!(f, "quest target value must be positive"),
        }
    }
}

impl std::error::Error for SimError {}

/// Result type alias for battle setup.
pub type SimResult<T> = Result<T, SimError>;
