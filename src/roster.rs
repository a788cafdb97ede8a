use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::draw::{assign_groups_with_rng, Draw, ParticipantId, Preference};
use crate::error::{DrawError, RosterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Male,
    Female,
}

/// Participants and preferences to draw groups from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Roster {
    pub group_size: Option<usize>,
    pub males: Vec<ParticipantId>,
    pub females: Vec<ParticipantId>,
    pub preferences: Vec<Preference>,
}

/// What a single input line did to the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Skipped,
    Added(Category, ParticipantId),
    Paired(Preference),
    GroupSize(usize),
    /// Removed from the given pool, along with this many preferences.
    Removed(Category, ParticipantId, usize),
    NotFound(ParticipantId),
}

impl Roster {
    pub fn from_toml_str(source: &str) -> Result<Self, RosterError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let source = fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn total(&self) -> usize {
        self.males.len() + self.females.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Applies one line of the stdin grammar: `m:ID` (or `male:`), `f:ID`
    /// (or `female:`), `pair:A,B`, `size:N` or `delete:ID`. Korean keys
    /// 남/여/짝/조/삭제 also work. Blank lines and `#` comments are skipped.
    pub fn apply_line(&mut self, line: &str) -> Result<LineOutcome, RosterError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(LineOutcome::Skipped);
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(RosterError::UnrecognizedLine(line.to_string()));
        };
        let value = value.trim();

        match key.trim().to_lowercase().as_str() {
            "m" | "male" | "남" => self.add(Category::Male, value, line),
            "f" | "female" | "여" => self.add(Category::Female, value, line),
            "pair" | "짝" => {
                let pair = value
                    .split_once(',')
                    .map(|(a, b)| (a.trim(), b.trim()))
                    .filter(|(a, b)| !a.is_empty() && !b.is_empty() && !b.contains(','))
                    .ok_or_else(|| RosterError::InvalidPair(value.to_string()))?;
                let pref = Preference::new(pair.0, pair.1);
                self.preferences.push(pref.clone());
                Ok(LineOutcome::Paired(pref))
            }
            "size" | "조" => {
                let size = value
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| RosterError::InvalidGroupSize(value.to_string()))?;
                self.group_size = Some(size);
                Ok(LineOutcome::GroupSize(size))
            }
            "delete" | "삭제" => Ok(self.remove(value)),
            _ => Err(RosterError::UnrecognizedLine(line.to_string())),
        }
    }

    /// Applies every line, logging and skipping the ones that fail.
    /// Returns how many lines were skipped.
    pub fn apply_lines<I, S>(&mut self, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut skipped = 0;
        for (index, line) in lines.into_iter().enumerate() {
            if let Err(err) = self.apply_line(line.as_ref()) {
                warn!(line = index + 1, error = %err, "skipping input line");
                skipped += 1;
            }
        }
        skipped
    }

    /// Group size to draw with: `requested` wins over the roster's own.
    pub fn resolve_group_size(&self, requested: Option<usize>) -> Result<usize, RosterError> {
        requested
            .or(self.group_size)
            .ok_or(RosterError::MissingGroupSize)
    }

    fn add(
        &mut self,
        category: Category,
        id: &str,
        line: &str,
    ) -> Result<LineOutcome, RosterError> {
        if id.is_empty() {
            return Err(RosterError::UnrecognizedLine(line.to_string()));
        }
        let pool = match category {
            Category::Male => &mut self.males,
            Category::Female => &mut self.females,
        };
        pool.push(id.to_string());
        Ok(LineOutcome::Added(category, id.to_string()))
    }

    /// Removes the first occurrence of `id`, searching males then females,
    /// and drops every preference that names it.
    pub fn remove(&mut self, id: &str) -> LineOutcome {
        let category = if let Some(pos) = self.males.iter().position(|m| m == id) {
            self.males.remove(pos);
            Category::Male
        } else if let Some(pos) = self.females.iter().position(|f| f == id) {
            self.females.remove(pos);
            Category::Female
        } else {
            return LineOutcome::NotFound(id.to_string());
        };

        let before = self.preferences.len();
        self.preferences.retain(|p| !p.involves(id));
        LineOutcome::Removed(category, id.to_string(), before - self.preferences.len())
    }

    pub fn draw_with_rng<R: Rng + ?Sized>(
        &self,
        group_size: usize,
        rng: &mut R,
    ) -> Result<Draw, DrawError> {
        assign_groups_with_rng(
            &self.males,
            &self.females,
            &self.preferences,
            group_size,
            rng,
        )
    }
}
