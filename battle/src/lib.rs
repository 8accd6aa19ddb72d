//! Deterministic single-battle simulator for a collectible-card game.
//!
//! A battle is a pure function of two decks, a battle configuration and an
//! RNG seed: the same inputs always replay the same battle. The crate does
//! no I/O; diagnostics go through the `log` facade and the outcome comes
//! back as a [`Results`].
//!
//! ```
//! use warbound_battle::*;
//!
//! let mut pool = CardPool::new();
//! pool.add(Card::new(1, "Warlord", CardType::Commander, Faction::Imperial, 0, 50, 0));
//! pool.add(Card::new(2, "Grunt", CardType::Assault, Faction::Imperial, 3, 5, 1));
//!
//! let commander = pool.get(1).unwrap();
//! let grunt = pool.get(2).unwrap();
//! let attacker = Deck::new(commander, vec![grunt; 5]).unwrap();
//! let defender = Deck::new(commander, vec![grunt; 5]).unwrap();
//!
//! let mut battle = Battle::new(
//!     attacker,
//!     defender,
//!     BattleConfig::default(),
//!     XorShiftRng::seed_from_u64(7),
//! )
//! .unwrap();
//! let results = battle.run();
//! assert_eq!(results.wins + results.draws + results.losses, 1);
//! ```

mod attack;
mod battle;
mod cards;
mod deck;
mod error;
mod field;
mod rng;
mod skills;
mod status;
mod types;

#[cfg(test)]
mod tests;

pub use battle::{play, Battle};
pub use cards::{Card, CardId, CardPool};
pub use deck::{Deck, DeckStrategy};
pub use error::{SimError, SimResult};
pub use field::{Field, Hand, Phase, Slot, UnitRef};
pub use rng::{BattleRng, XorShiftRng};
pub use status::CardStatus;
pub use types::*;
