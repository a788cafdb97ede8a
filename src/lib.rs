//! Group draw: split a roster into equal-size groups, keeping requested
//! pairs together and filling the rest at random.

pub mod draw;
pub mod error;
pub mod report;
pub mod roster;

pub use draw::{assign_groups, assign_groups_with_rng, Draw, Group, ParticipantId, Preference};
pub use error::{DrawError, RosterError};
pub use roster::{Category, LineOutcome, Roster};
