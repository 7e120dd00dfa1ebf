//! # Reaction record store
//!
//! Ordered, reaction-keyed storage of a parsed mechanism: every reaction keeps the
//! sequence of its rate entries (one per DUPLICATE occurrence, or one per compared
//! mechanism) and the free-form comment it carried in the source file.
//! Insertion order is the order of the mechanism file; sorting produces a new store
//! through [`Mechanism::reordered`] and never touches the keys or the entries.
//!
//! The store is filled by the mechanism parser, either programmatically with
//! [`Mechanism::add_reaction`] or from JSON:
//! ```json
//! {
//!   "species": [{"name": "H2", "formula": {"H": 2}, "mult": 1}],
//!   "reactions": [
//!     {"reaction": {"reactants": ["H2", "O"], "products": ["OH", "H"], "third_bodies": [null]},
//!      "rates": [{"form": "Table", "data": {"high": [[500.0], [1.0e10]]}}]}
//!   ],
//!   "header_lines": 0
//! }
//! ```
use crate::Mechanism::molmass::{FormulaError, hill_formula, sum_formulas};
use crate::Mechanism::rate_data::RateEntry;
use crate::Mechanism::reaction::Reaction;
use crate::Mechanism::species::{SpeciesData, SpeciesTable};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MechanismError {
    #[error("reaction {0} is not part of the mechanism")]
    UnknownReaction(String),
    #[error("reaction {0} appears twice in the requested ordering")]
    RepeatedReaction(String),
    #[error("failed to read mechanism file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid mechanism JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Formula(#[from] FormulaError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub reaction: Reaction,
    #[serde(default)]
    pub rates: Vec<Option<RateEntry>>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MechanismData {
    #[serde(default)]
    species: Vec<SpeciesData>,
    reactions: Vec<ReactionRecord>,
    #[serde(default)]
    header_lines: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Mechanism {
    pub species: SpeciesTable,
    pub header_lines: usize,
    records: Vec<ReactionRecord>,
    index: HashMap<Reaction, usize>,
}

impl Mechanism {
    pub fn new(species: SpeciesTable) -> Self {
        Self {
            species,
            ..Default::default()
        }
    }

    /// Appends a reaction, or one more rate entry when the reaction is already stored.
    pub fn add_reaction(&mut self, reaction: Reaction, rate: Option<RateEntry>) {
        match self.index.get(&reaction) {
            Some(&i) => self.records[i].rates.push(rate),
            None => self.push_record(ReactionRecord {
                reaction,
                rates: vec![rate],
                comment: None,
            }),
        }
    }

    pub fn add_record(&mut self, record: ReactionRecord) {
        match self.index.get(&record.reaction) {
            Some(&i) => {
                let existing = &mut self.records[i];
                existing.rates.extend(record.rates);
                if existing.comment.is_none() {
                    existing.comment = record.comment;
                }
            }
            None => self.push_record(record),
        }
    }

    fn push_record(&mut self, record: ReactionRecord) {
        self.index.insert(record.reaction.clone(), self.records.len());
        self.records.push(record);
    }

    pub fn set_comment(&mut self, reaction: &Reaction, comment: &str) -> Result<(), MechanismError> {
        let i = self
            .position(reaction)
            .ok_or_else(|| MechanismError::UnknownReaction(reaction.to_string()))?;
        self.records[i].comment = Some(comment.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, reaction: &Reaction) -> bool {
        self.index.contains_key(reaction)
    }

    pub fn position(&self, reaction: &Reaction) -> Option<usize> {
        self.index.get(reaction).copied()
    }

    pub fn get(&self, reaction: &Reaction) -> Option<&ReactionRecord> {
        self.position(reaction).map(|i| &self.records[i])
    }

    pub fn records(&self) -> &[ReactionRecord] {
        &self.records
    }

    pub fn reactions(&self) -> impl DoubleEndedIterator<Item = &Reaction> + ExactSizeIterator {
        self.records.iter().map(|r| &r.reaction)
    }

    /// New store holding the given reactions in the given order with unchanged entries.
    /// A subset of the reactions is accepted; unknown or repeated keys are not.
    pub fn reordered(&self, order: &[Reaction]) -> Result<Mechanism, MechanismError> {
        let mut out = Mechanism::new(self.species.clone());
        out.header_lines = self.header_lines;
        for reaction in order {
            let record = self
                .get(reaction)
                .ok_or_else(|| MechanismError::UnknownReaction(reaction.to_string()))?;
            if out.contains(reaction) {
                return Err(MechanismError::RepeatedReaction(reaction.to_string()));
            }
            out.push_record(record.clone());
        }
        Ok(out)
    }

    /// Hill formula of the reacting reactants; spectators and third bodies are left out.
    /// Reactions with species of unknown composition get a name-based signature.
    pub fn formula_signature(&self, reaction: &Reaction) -> String {
        let (reactants, _) = reaction.reacting_sides();
        let formulas: Option<Vec<_>> = reactants.iter().map(|s| self.species.formula(s)).collect();
        match formulas {
            Some(formulas) if !formulas.is_empty() => hill_formula(&sum_formulas(formulas)),
            _ => {
                warn!("no formula for some reactants of {}, grouping by name", reaction);
                let mut names: Vec<&str> = reactants.iter().map(|s| self.species.canonical(s)).collect();
                names.sort_unstable();
                format!("?{}", names.join("+"))
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Mechanism, MechanismError> {
        let data: MechanismData = serde_json::from_str(json)?;
        let mut mech = Mechanism::new(data.species.into_iter().collect());
        mech.header_lines = data.header_lines;
        for record in data.reactions {
            mech.add_record(record);
        }
        Ok(mech)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Mechanism, MechanismError> {
        let content = fs::read_to_string(path.as_ref())?;
        let mech = Self::from_json(&content)?;
        info!(
            "loaded mechanism {} with {} reactions and {} species",
            path.as_ref().display(),
            mech.len(),
            mech.species.len()
        );
        Ok(mech)
    }

    pub fn to_json(&self) -> Result<String, MechanismError> {
        let data = MechanismData {
            species: self
                .species
                .names()
                .filter_map(|n| self.species.get(n).cloned())
                .collect(),
            reactions: self.records.clone(),
            header_lines: self.header_lines,
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }
}
