use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::DrawError;

pub type ParticipantId = String;

/// Two participants who asked to end up in the same group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Preference(pub ParticipantId, pub ParticipantId);

impl Preference {
    pub fn new(a: impl Into<ParticipantId>, b: impl Into<ParticipantId>) -> Self {
        Preference(a.into(), b.into())
    }

    pub fn involves(&self, id: &str) -> bool {
        self.0 == id || self.1 == id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub members: Vec<ParticipantId>,
    #[serde(skip)]
    capacity: usize,
}

impl Group {
    pub fn new(capacity: usize) -> Self {
        Group {
            members: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn free_slots(&self) -> usize {
        self.capacity.saturating_sub(self.members.len())
    }

    pub fn is_full(&self) -> bool {
        self.free_slots() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }
}

/// Outcome of a successful draw.
///
/// Preference placement is best-effort: `deferred` lists pairs that found no
/// group with two free slots, and `unplaced` lists anyone the fill pass had
/// no room for (only possible when preferences name people outside the
/// roster, or name the same person twice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draw {
    pub groups: Vec<Group>,
    pub honored: Vec<Preference>,
    pub deferred: Vec<Preference>,
    pub unplaced: Vec<ParticipantId>,
    /// Male count per group matching the overall ratio. Informational only;
    /// placement does not use it.
    pub ideal_males_per_group: usize,
}

impl Draw {
    /// Index of the group holding `id`, if any.
    pub fn group_of(&self, id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(id))
    }
}

/// Validates `group_size` against the population and returns the group count.
pub fn check_group_size(total: usize, group_size: usize) -> Result<usize, DrawError> {
    if group_size == 0 {
        return Err(DrawError::ZeroGroupSize);
    }
    if total % group_size != 0 {
        return Err(DrawError::SizeMismatch {
            total,
            group_size,
            suggestions: suggest_group_sizes(total, group_size),
        });
    }
    Ok(total / group_size)
}

/// Group sizes obtained by keeping the requested group count, or one more.
/// A candidate that would divide by zero is left out.
pub fn suggest_group_sizes(total: usize, group_size: usize) -> Vec<usize> {
    let Some(num_groups) = total.checked_div(group_size) else {
        return Vec::new();
    };
    [num_groups, num_groups + 1]
        .into_iter()
        .filter_map(|n| total.checked_div(n))
        .collect()
}

/// `round(males / total * group_size)`, rounding halves to even.
pub fn ideal_males_per_group(males: usize, total: usize, group_size: usize) -> usize {
    if total == 0 {
        return 0;
    }
    let ratio = males as f64 / total as f64;
    (ratio * group_size as f64).round_ties_even() as usize
}

pub fn assign_groups(
    males: &[ParticipantId],
    females: &[ParticipantId],
    preferences: &[Preference],
    group_size: usize,
) -> Result<Draw, DrawError> {
    assign_groups_with_rng(
        males,
        females,
        preferences,
        group_size,
        &mut rand::thread_rng(),
    )
}

/// Same as [`assign_groups`], shuffling the leftover participants with `rng`.
pub fn assign_groups_with_rng<R: Rng + ?Sized>(
    males: &[ParticipantId],
    females: &[ParticipantId],
    preferences: &[Preference],
    group_size: usize,
    rng: &mut R,
) -> Result<Draw, DrawError> {
    let total = males.len() + females.len();
    let num_groups = check_group_size(total, group_size)?;

    let mut groups: Vec<Group> = (0..num_groups).map(|_| Group::new(group_size)).collect();
    let ideal = ideal_males_per_group(males.len(), total, group_size);
    debug!(
        total,
        group_size,
        num_groups,
        ideal_males_per_group = ideal,
        "allocated groups"
    );

    // Preferences first, both members into the first group with two free slots.
    let mut used: HashSet<&str> = HashSet::new();
    let mut honored = Vec::new();
    let mut deferred = Vec::new();
    for pref in preferences {
        match groups.iter_mut().position(|g| g.free_slots() >= 2) {
            Some(index) => {
                let group = &mut groups[index];
                group.members.push(pref.0.clone());
                group.members.push(pref.1.clone());
                used.insert(pref.0.as_str());
                used.insert(pref.1.as_str());
                debug!(a = %pref.0, b = %pref.1, group = index, "placed preference");
                honored.push(pref.clone());
            }
            None => {
                debug!(a = %pref.0, b = %pref.1, "no group with room for preference");
                deferred.push(pref.clone());
            }
        }
    }

    let mut remaining: Vec<&ParticipantId> = males
        .iter()
        .chain(females)
        .filter(|id| !used.contains(id.as_str()))
        .collect();
    remaining.shuffle(rng);

    let mut unplaced = Vec::new();
    for person in remaining {
        match groups.iter_mut().find(|g| !g.is_full()) {
            Some(group) => group.members.push(person.clone()),
            None => {
                warn!(participant = %person, "no free slot left");
                unplaced.push(person.clone());
            }
        }
    }

    info!(
        groups = groups.len(),
        honored = honored.len(),
        deferred = deferred.len(),
        unplaced = unplaced.len(),
        "group draw complete"
    );

    Ok(Draw {
        groups,
        honored,
        deferred,
        unplaced,
        ideal_males_per_group: ideal,
    })
}
