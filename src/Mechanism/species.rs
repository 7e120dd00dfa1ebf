use crate::Mechanism::molmass::{Formula, FormulaError, hill_formula, molar_mass, parse_formula};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Species metadata handed over by the mechanism parser: formula, spin multiplicity
/// and an optional structural identifier used as canonical identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub name: String,
    pub formula: Formula,
    #[serde(default = "default_mult")]
    pub mult: usize,
    #[serde(default)]
    pub inchi: Option<String>,
}

fn default_mult() -> usize {
    1
}

impl SpeciesData {
    pub fn new(name: &str, formula: Formula, mult: usize) -> Self {
        Self {
            name: name.to_string(),
            formula,
            mult,
            inchi: None,
        }
    }

    pub fn from_formula_str(name: &str, formula: &str, mult: usize) -> Result<Self, FormulaError> {
        Ok(Self::new(name, parse_formula(formula)?, mult))
    }

    pub fn with_inchi(mut self, inchi: &str) -> Self {
        self.inchi = Some(inchi.to_string());
        self
    }

    pub fn is_radical(&self) -> bool {
        self.mult > 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTable {
    species: BTreeMap<String, SpeciesData>,
}

impl SpeciesTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, data: SpeciesData) {
        self.species.insert(data.name.clone(), data);
    }

    pub fn get(&self, name: &str) -> Option<&SpeciesData> {
        self.species.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.species.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.species.keys()
    }

    /// Canonical identity: the structural identifier when one is known, the name otherwise.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        match self.species.get(name).and_then(|s| s.inchi.as_deref()) {
            Some(inchi) => inchi,
            None => name,
        }
    }

    /// Spin multiplicity; species without metadata count as closed shell.
    pub fn mult(&self, name: &str) -> usize {
        match self.species.get(name) {
            Some(data) => data.mult,
            None => {
                warn!("no metadata for species {}, assuming multiplicity 1", name);
                1
            }
        }
    }

    pub fn is_radical(&self, name: &str) -> bool {
        self.mult(name) > 1
    }

    pub fn formula(&self, name: &str) -> Option<&Formula> {
        self.species.get(name).map(|s| &s.formula)
    }

    pub fn hill(&self, name: &str) -> Option<String> {
        self.formula(name).map(hill_formula)
    }

    /// Molar mass in g/mol, 0 for unknown species or formulas.
    pub fn molar_mass(&self, name: &str) -> f64 {
        match self.formula(name) {
            Some(formula) => molar_mass(formula).unwrap_or_else(|e| {
                warn!("molar mass of {} unavailable: {}", name, e);
                0.0
            }),
            None => 0.0,
        }
    }

    /// Species carrying exactly the given formula, in name order.
    pub fn with_formula(&self, formula: &Formula) -> Vec<&str> {
        self.species
            .values()
            .filter(|s| &s.formula == formula)
            .map(|s| s.name.as_str())
            .collect()
    }
}

impl FromIterator<SpeciesData> for SpeciesTable {
    fn from_iter<T: IntoIterator<Item = SpeciesData>>(iter: T) -> Self {
        let mut table = SpeciesTable::new();
        for data in iter {
            table.insert(data);
        }
        table
    }
}
