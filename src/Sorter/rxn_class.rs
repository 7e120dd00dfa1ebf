//! Reaction classification.
//!
//! The broad classifier only looks at the number of reacting species on each side, their
//! spin multiplicities and their formulas, so it is total and cheap. A structural (graph)
//! classifier can be plugged in through [`GraphClassifier`]; its labels are combined with
//! the broad ones as `graph.broad`.
use crate::Mechanism::molmass::{Formula, add_formulas, parse_formula, subtract_formulas};
use crate::Mechanism::reaction::Reaction;
use crate::Mechanism::species::SpeciesTable;
use log::warn;
use std::collections::HashMap;
use thiserror::Error;

pub const UNCLASSIFIED: &str = "unclassified";

// small species reported in the class label, matched by formula
const SMALL_SPECIES: [(&str, &str); 5] = [("H", "H"), ("O", "O"), ("OH", "OH"), ("O2", "O2"), ("HO2", "HO2")];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("structural classification of {reaction} failed: {message}")]
    Failed { reaction: String, message: String },
    #[error("no structural label available for {0}")]
    Unavailable(String),
}

/// Structure-based classification delegate. `Ok(None)` means the delegate has no label
/// for the reaction, which is reported as `unclassified`; errors are passed on unchanged.
pub trait GraphClassifier {
    fn classify(&self, reaction: &Reaction, species: &SpeciesTable) -> Result<Option<String>, ClassifierError>;
}

/// Used when no structural chemistry backend is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGraphClassifier;

impl GraphClassifier for NoGraphClassifier {
    fn classify(&self, _reaction: &Reaction, _species: &SpeciesTable) -> Result<Option<String>, ClassifierError> {
        Ok(None)
    }
}

/// Labels computed elsewhere (e.g. by an external graph tool) and looked up by reaction.
/// In strict mode a missing reaction is an error instead of `unclassified`.
#[derive(Debug, Clone, Default)]
pub struct TabulatedClassifier {
    labels: HashMap<Reaction, String>,
    strict: bool,
}

impl TabulatedClassifier {
    pub fn new(labels: HashMap<Reaction, String>) -> Self {
        Self { labels, strict: false }
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn insert(&mut self, reaction: Reaction, label: &str) {
        self.labels.insert(reaction, label.to_string());
    }
}

impl GraphClassifier for TabulatedClassifier {
    fn classify(&self, reaction: &Reaction, _species: &SpeciesTable) -> Result<Option<String>, ClassifierError> {
        match self.labels.get(reaction) {
            Some(label) => Ok(Some(label.clone())),
            None if self.strict => Err(ClassifierError::Unavailable(reaction.to_string())),
            None => Ok(None),
        }
    }
}

/// Structural label or `unclassified`.
pub fn classify_graph(
    classifier: &dyn GraphClassifier,
    reaction: &Reaction,
    species: &SpeciesTable,
) -> Result<String, ClassifierError> {
    Ok(classifier
        .classify(reaction, species)?
        .unwrap_or_else(|| UNCLASSIFIED.to_string()))
}

pub fn composite_label(graph: &str, broad: &str) -> String {
    format!("{}.{}", graph, broad)
}

fn small_species_label(name: &str, species: &SpeciesTable) -> Option<&'static str> {
    let formula = species.formula(name)?;
    SMALL_SPECIES
        .iter()
        .find(|(_, f)| parse_formula(f).ok().as_ref() == Some(formula))
        .map(|(label, _)| *label)
}

fn has_hydrogen(name: &str, species: &SpeciesTable) -> bool {
    species
        .formula(name)
        .is_some_and(|f| f.get("H").copied().unwrap_or(0) > 0)
}

fn radical_count(side: &[&str], species: &SpeciesTable) -> usize {
    side.iter().filter(|s| species.is_radical(s)).count()
}

fn radical_balance(reactants: &[&str], products: &[&str], species: &SpeciesTable) -> &'static str {
    let before = radical_count(reactants, species);
    let after = radical_count(products, species);
    match after.cmp(&before) {
        std::cmp::Ordering::Less => "termination",
        std::cmp::Ordering::Equal => "propagation",
        std::cmp::Ordering::Greater => "branching",
    }
}

/// True when one reactant loses an H atom that ends up on the other one.
fn is_h_transfer(reactants: &[&str], products: &[&str], species: &SpeciesTable) -> bool {
    let formulas = |side: &[&str]| -> Option<Vec<Formula>> {
        side.iter().map(|s| species.formula(s).cloned()).collect()
    };
    let (Some(rf), Some(pf)) = (formulas(reactants), formulas(products)) else {
        return false;
    };
    let h: Formula = [("H".to_string(), 1)].into_iter().collect();
    for (a, b) in [(0, 1), (1, 0)] {
        for (c, d) in [(0, 1), (1, 0)] {
            if subtract_formulas(&rf[a], &h).as_ref() == Some(&pf[c]) && add_formulas(&rf[b], &h) == pf[d] {
                return true;
            }
        }
    }
    false
}

fn with_product_suffix(class: &str, products: &[&str], species: &SpeciesTable) -> String {
    match products.iter().find_map(|p| small_species_label(p, species)) {
        Some(label) => format!("{} +{}", class, label),
        None => class.to_string(),
    }
}

fn dissociation(reactant: &str, products: &[&str], species: &SpeciesTable) -> String {
    let class = if species.is_radical(reactant) {
        let closed_with_h = products
            .iter()
            .any(|p| !species.is_radical(p) && has_hydrogen(p, species));
        if closed_with_h { "Beta-scission" } else { "Decomposition" }
    } else if products.iter().all(|p| species.is_radical(p)) {
        "Bond fission"
    } else {
        "Decomposition"
    };
    with_product_suffix(class, products, species)
}

fn association(reactants: &[&str], species: &SpeciesTable) -> String {
    let class = if reactants.iter().all(|r| species.is_radical(r)) {
        "Recombination"
    } else {
        "Addition"
    };
    // lighter partner; the first one on equal masses
    let lighter = if species.molar_mass(reactants[1]) < species.molar_mass(reactants[0]) {
        reactants[1]
    } else {
        reactants[0]
    };
    match small_species_label(lighter, species) {
        Some(label) => format!("{} {}", class, label),
        None => class.to_string(),
    }
}

/// Broad class of a reaction from its stoichiometry and multiplicities. Total: reactions
/// that fit no pattern are `unclassified`.
pub fn classify_broad(reaction: &Reaction, species: &SpeciesTable) -> String {
    let (reactants, products) = reaction.reacting_sides();
    match (reactants.len(), products.len()) {
        (1, 1) => "Isomerization".to_string(),
        (1, 2) => dissociation(reactants[0], &products, species),
        (1, n) if n >= 3 => "Decomposition(lumped)".to_string(),
        (2, 1) => association(&reactants, species),
        (2, 2) => {
            let balance = radical_balance(&reactants, &products, species);
            if reactants.iter().all(|r| species.is_radical(r)) {
                format!("Recombination-decomposition - {}", balance)
            } else if is_h_transfer(&reactants, &products, species) {
                "H abstraction".to_string()
            } else {
                format!("Addition-decomposition - {}", balance)
            }
        }
        (2, n) if n >= 3 => "Addition-decomposition(lumped)".to_string(),
        _ => {
            warn!("no broad class for {}", reaction);
            UNCLASSIFIED.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sorter::test_fixtures::*;

    fn species() -> SpeciesTable {
        let mut all = c2h4_species();
        all.extend(ic8_species());
        all.into_iter().collect()
    }

    #[test]
    fn ethylene_classes() {
        let spc = species();
        let expected = [
            "Decomposition",
            "Recombination H",
            "Addition H",
            "H abstraction",
            "Addition-decomposition - propagation",
            "Recombination-decomposition - termination",
            "Addition-decomposition - branching",
            "Addition OH",
            "Recombination-decomposition - termination",
            "H abstraction",
            "Beta-scission +HO2",
            "H abstraction",
            "Addition-decomposition - termination",
        ];
        for (r, class) in c2h4_reactions().iter().zip(expected) {
            assert_eq!(classify_broad(r, &spc), class, "{}", r);
        }
    }

    #[test]
    fn remaining_classes() {
        let spc = species();
        let expected = [
            "Recombination H",
            "Decomposition",
            "Beta-scission",
            "Recombination-decomposition - termination",
            "Isomerization",
            "Isomerization",
            "Recombination-decomposition - propagation",
        ];
        for (r, class) in c2h4_class_reactions().iter().zip(expected) {
            assert_eq!(classify_broad(r, &spc), class, "{}", r);
        }
    }

    #[test]
    fn iso_octane_classes() {
        let spc = species();
        let cases = [
            (rxn(&["IC8"], &["NEOC5H11", "IC3H7"]), "Bond fission"),
            (rxn(&["IC8OOH1"], &["IC8-1OR", "OH"]), "Bond fission +OH"),
            (rxn(&["IC8-1R", "O2"], &["IC8-1O2R"]), "Recombination O2"),
            (rxn(&["IC8OOH1-1AR"], &["CH2O", "I24C7D1", "OH"]), "Decomposition(lumped)"),
            (rxn(&["IC8OOH1-1AR"], &["IC8O1-1A", "OH"]), "Beta-scission +OH"),
            (rxn(&["IC8-1O2R", "H2O2"], &["IC8OOH1", "HO2"]), "H abstraction"),
            (rxn(&["IC8-1R", "CH3O2"], &["IC8-1OR", "CH3O"]), "Recombination-decomposition - propagation"),
        ];
        for (r, class) in cases {
            assert_eq!(classify_broad(&r, &spc), class, "{}", r);
        }
    }

    #[test]
    fn lumped_and_spectator_forms() {
        let spc = species();
        let r = rxn(&["C2H4", "O"], &["CH3", "H", "CO"]);
        assert_eq!(classify_broad(&r, &spc), "Addition-decomposition(lumped)");
        // collider written on both sides does not change the class
        let r = rxn(&["C2H3", "H", "O2"], &["C2H4", "O2"]);
        assert_eq!(classify_broad(&r, &spc), "Recombination H");
        let r = rxn(&["H", "H", "H"], &["H2", "H"]);
        assert_eq!(classify_broad(&r, &spc), "Recombination H");
        let r = rxn(&["H", "H", "O"], &["H2O"]);
        assert_eq!(classify_broad(&r, &spc), UNCLASSIFIED);
    }

    #[test]
    fn graph_labels() {
        let spc = species();
        let r = rxn_tb(&["C2H3", "H"], &["C2H4"], "(+M)");
        let other = rxn(&["C3H5-A"], &["C3H5-S"]);

        let none = NoGraphClassifier;
        assert_eq!(classify_graph(&none, &r, &spc).unwrap(), UNCLASSIFIED);

        let mut table = TabulatedClassifier::default();
        table.insert(r.clone(), "addition");
        let graph = classify_graph(&table, &r, &spc).unwrap();
        assert_eq!(composite_label(&graph, &classify_broad(&r, &spc)), "addition.Recombination H");
        assert_eq!(classify_graph(&table, &other, &spc).unwrap(), UNCLASSIFIED);

        let strict = table.strict();
        assert_eq!(
            classify_graph(&strict, &other, &spc),
            Err(ClassifierError::Unavailable(other.to_string()))
        );
    }
}
