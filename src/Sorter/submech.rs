//! # Fuel submechanism selection
//!
//! Species are typed relative to each isolated fuel `F` by formula:
//!
//! | label | species |
//! |---|---|
//! | `FUEL` | `F` itself |
//! | `FUEL_RAD` | formula `F - H` |
//! | `FUEL_ADD_O2` | formula `F + O2` |
//! | `FUEL_ADD_O4` | formula `F + O4` |
//! | `R_O2` | formula `F - H + O2` |
//! | `R_O4` | formula `F - H + O4` |
//!
//! A reaction takes the first label of the table found among its species. The extended
//! selection also learns new additive fragments from association reactions `S + X = P`
//! where `S` is already typed and `X` is a radical: `P` is then typed `FUEL_ADD_X`,
//! `R_X` or `<label of S>_X`. Reactions left without a label are `SUBFUEL` in that mode.
use crate::Mechanism::mech_store::Mechanism;
use crate::Mechanism::molmass::{Formula, add_formulas, parse_formula, subtract_formulas};
use crate::Mechanism::reaction::Reaction;
use log::{info, warn};
use std::collections::{BTreeMap, HashMap};

pub const SUBFUEL: &str = "SUBFUEL";

const BASE_LABELS: [&str; 6] = ["FUEL", "FUEL_RAD", "FUEL_ADD_O2", "FUEL_ADD_O4", "R_O2", "R_O4"];

#[derive(Debug, Clone, Default)]
pub struct SubmechSelection {
    /// labels in priority order
    pub labels: Vec<String>,
    /// species name -> label
    pub species_labels: BTreeMap<String, String>,
    reaction_labels: HashMap<Reaction, String>,
}

impl SubmechSelection {
    pub fn label_of(&self, reaction: &Reaction) -> Option<&str> {
        self.reaction_labels.get(reaction).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.reaction_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reaction_labels.is_empty()
    }
}

fn base_formula(label: &str, fuel: &Formula) -> Option<Formula> {
    let parsed = |f: &str| parse_formula(f).ok();
    let radical = || subtract_formulas(fuel, &parsed("H")?);
    match label {
        "FUEL" => Some(fuel.clone()),
        "FUEL_RAD" => radical(),
        "FUEL_ADD_O2" => Some(add_formulas(fuel, &parsed("O2")?)),
        "FUEL_ADD_O4" => Some(add_formulas(fuel, &parsed("O4")?)),
        "R_O2" => Some(add_formulas(&radical()?, &parsed("O2")?)),
        "R_O4" => Some(add_formulas(&radical()?, &parsed("O4")?)),
        _ => None,
    }
}

// first label wins
fn type_species(typed: &mut BTreeMap<String, String>, name: &str, label: &str) {
    typed.entry(name.to_string()).or_insert_with(|| label.to_string());
}

fn fragment_label(seed: &str, fragment: &str) -> String {
    match seed {
        "FUEL" => format!("FUEL_ADD_{}", fragment),
        "FUEL_RAD" => format!("R_{}", fragment),
        other => format!("{}_{}", other, fragment),
    }
}

/// Types the species of `mech` around the `isolate` fuels and labels every reaction
/// that involves a typed species.
pub fn select_submech(mech: &Mechanism, isolate: &[String], extended: bool, max_depth: usize) -> SubmechSelection {
    let species = &mech.species;
    let mut typed: BTreeMap<String, String> = BTreeMap::new();

    for label in BASE_LABELS {
        for fuel in isolate {
            let Some(fuel_formula) = species.formula(fuel) else {
                warn!("isolate species {} has no formula, skipped", fuel);
                continue;
            };
            if label == "FUEL" {
                type_species(&mut typed, fuel, label);
                continue;
            }
            if let Some(target) = base_formula(label, fuel_formula) {
                for name in species.with_formula(&target) {
                    type_species(&mut typed, name, label);
                }
            }
        }
    }
    let mut labels: Vec<String> = BASE_LABELS.iter().map(|l| l.to_string()).collect();

    if extended {
        for depth in 0..max_depth {
            let snapshot = typed.clone();
            let mut found: BTreeMap<String, Formula> = BTreeMap::new();
            for reaction in mech.reactions() {
                let (reactants, products) = reaction.reacting_sides();
                let (pair, adduct) = match (reactants.as_slice(), products.as_slice()) {
                    ([a, b], [p]) | ([p], [a, b]) => ([*a, *b], *p),
                    _ => continue,
                };
                let Some(adduct_formula) = species.formula(adduct) else {
                    continue;
                };
                for (seed, fragment) in [(pair[0], pair[1]), (pair[1], pair[0])] {
                    let (Some(seed_label), Some(seed_formula), Some(fragment_formula)) = (
                        snapshot.get(seed),
                        species.formula(seed),
                        species.formula(fragment),
                    ) else {
                        continue;
                    };
                    if !species.is_radical(fragment) {
                        continue;
                    }
                    if &add_formulas(seed_formula, fragment_formula) == adduct_formula {
                        found
                            .entry(fragment_label(seed_label, fragment))
                            .or_insert_with(|| adduct_formula.clone());
                    }
                }
            }
            let before = typed.len();
            for (label, formula) in &found {
                if !labels.contains(label) {
                    labels.push(label.clone());
                }
                for name in species.with_formula(formula) {
                    type_species(&mut typed, name, label);
                }
            }
            if typed.len() == before {
                info!("submechanism discovery converged after {} rounds", depth + 1);
                break;
            }
        }
    }

    let rank: HashMap<&str, usize> = labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();
    let mut reaction_labels = HashMap::new();
    for reaction in mech.reactions() {
        let best = reaction
            .species()
            .into_iter()
            .filter_map(|s| typed.get(s))
            .min_by_key(|label| rank.get(label.as_str()).copied().unwrap_or(usize::MAX));
        match best {
            Some(label) => {
                reaction_labels.insert(reaction.clone(), label.clone());
            }
            None if extended => {
                reaction_labels.insert(reaction.clone(), SUBFUEL.to_string());
            }
            None => {}
        }
    }
    info!(
        "submechanism of {:?}: {} of {} reactions labelled, {} labels",
        isolate,
        reaction_labels.len(),
        mech.len(),
        labels.len()
    );
    SubmechSelection {
        labels,
        species_labels: typed,
        reaction_labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sorter::test_fixtures::*;

    fn isolate(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn iso_octane_submechanism() {
        let mech = ic8_mechanism();
        let sel = select_submech(&mech, &isolate(&["IC8"]), false, 1);
        let expected = [
            "FUEL_RAD",
            "FUEL",
            "R_O2",
            "FUEL_ADD_O2",
            "R_O2",
            "FUEL_ADD_O2",
            "FUEL_ADD_O2",
            "FUEL_RAD",
            "R_O2",
            "R_O2",
            "FUEL_RAD",
            "R_O2",
            "R_O2",
            "FUEL_RAD",
            "FUEL",
        ];
        assert_eq!(sel.len(), 15);
        for (r, label) in mech.reactions().zip(expected) {
            assert_eq!(sel.label_of(r), Some(label), "{}", r);
        }
        assert_eq!(sel.species_labels["IC8OOH1-1AO2R"], "R_O4");
    }

    #[test]
    fn unmatched_reactions_have_no_plain_label() {
        let mech = nuig_fragment();
        let sel = select_submech(&mech, &isolate(&["C5H10-2"]), false, 1);
        // AC5H10 has the fuel formula but is not the fuel itself
        assert_eq!(sel.len(), 1);
        assert!(sel.label_of(&rxn_tb(&["CH3", "IC4H7"], &["AC5H10"], "(+M)")).is_none());
        assert_eq!(
            sel.label_of(&rxn_tb(&["C5H10-2"], &["C4H71-3", "CH3"], "(+M)")),
            Some("FUEL")
        );
    }

    #[test]
    fn extended_discovers_additive_fragments() {
        let mech = c2h4_ext_mechanism();
        let sel = select_submech(&mech, &isolate(&["C2H4"]), true, 1);
        let expected = [
            "FUEL",
            "FUEL",
            "FUEL_RAD",
            "FUEL_ADD_H",
            "R_CH3",
            SUBFUEL,
            SUBFUEL,
            "FUEL",
        ];
        for (r, label) in mech.reactions().zip(expected) {
            assert_eq!(sel.label_of(r), Some(label), "{}", r);
        }
        assert_eq!(&sel.labels[6..], &["FUEL_ADD_H", "FUEL_ADD_OH", "R_CH3"]);
        assert_eq!(sel.species_labels["CC3H6"], "R_CH3");
        // CH2(S) is a singlet and does not open a new family
        assert!(!sel.labels.iter().any(|l| l.contains("CH2(S)")));
    }

    #[test]
    fn deeper_discovery_builds_on_new_labels() {
        let mut mech = c2h4_ext_mechanism();
        let ethyl_h = rxn(&["C2H5", "H"], &["C2H6"]);
        let methyl_recombination = rxn(&["CH3", "CH3"], &["C2H6"]);
        mech.add_reaction(ethyl_h.clone(), None);

        let shallow = select_submech(&mech, &isolate(&["C2H4"]), true, 1);
        assert!(!shallow.labels.contains(&"FUEL_ADD_H_H".to_string()));
        assert_eq!(shallow.label_of(&methyl_recombination), Some(SUBFUEL));

        let deep = select_submech(&mech, &isolate(&["C2H4"]), true, 2);
        assert!(deep.labels.contains(&"FUEL_ADD_H_H".to_string()));
        assert_eq!(deep.label_of(&methyl_recombination), Some("FUEL_ADD_H_H"));
        assert_eq!(deep.label_of(&ethyl_h), Some("FUEL_ADD_H"));
    }
}
