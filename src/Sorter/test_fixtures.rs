//! Small mechanisms shared by the sorter tests.
use crate::Mechanism::mech_store::Mechanism;
use crate::Mechanism::reaction::Reaction;
use crate::Mechanism::species::{SpeciesData, SpeciesTable};

pub fn spc(name: &str, formula: &str, mult: usize) -> SpeciesData {
    SpeciesData::from_formula_str(name, formula, mult).unwrap()
}

pub fn rxn(reactants: &[&str], products: &[&str]) -> Reaction {
    Reaction::new(reactants, products, &[None])
}

pub fn rxn_tb(reactants: &[&str], products: &[&str], third_body: &str) -> Reaction {
    Reaction::new(reactants, products, &[Some(third_body)])
}

pub fn mechanism(species: Vec<SpeciesData>, reactions: Vec<Reaction>) -> Mechanism {
    let table: SpeciesTable = species.into_iter().collect();
    let mut mech = Mechanism::new(table);
    for r in reactions {
        mech.add_reaction(r, None);
    }
    mech
}

pub fn ic8_species() -> Vec<SpeciesData> {
    vec![
        spc("IC8", "C8H18", 1),
        spc("IC8-1R", "C8H17", 2),
        spc("IC8-3R", "C8H17", 2),
        spc("IC8-5R", "C8H17", 2),
        spc("NEOC5H11", "C5H11", 2),
        spc("IC3H7", "C3H7", 2),
        spc("IC8OOH1-1AR", "C8H17O2", 2),
        spc("IC8O1-1A", "C8H16O", 1),
        spc("OH", "OH", 2),
        spc("IC8OOH1", "C8H18O2", 1),
        spc("IC8-1OR", "C8H17O", 2),
        spc("O2", "O2", 3),
        spc("IC8OOH1-1AO2R", "C8H17O4", 2),
        spc("IC8-1O2R", "C8H17O2", 2),
        spc("IC8-3O2R", "C8H17O2", 2),
        spc("HO2", "HO2", 2),
        spc("H2O2", "H2O2", 1),
        spc("CH3O2", "CH3O2", 2),
        spc("CH3O", "CH3O", 2),
        spc("IC4H7OOH", "C4H8O2", 1),
        spc("IC4H9", "C4H9", 2),
        spc("CH2O", "CH2O", 1),
        spc("I24C7D1", "C7H14", 1),
        spc("IC8D3", "C8H16", 1),
    ]
}

/// Reduced iso-octane low-temperature chemistry, 15 reactions over 8 PESs.
pub fn ic8_reactions() -> Vec<Reaction> {
    vec![
        rxn(&["IC8-1R"], &["IC8-5R"]),
        rxn(&["IC8"], &["NEOC5H11", "IC3H7"]),
        rxn(&["IC8OOH1-1AR"], &["IC8O1-1A", "OH"]),
        rxn(&["IC8OOH1"], &["IC8-1OR", "OH"]),
        rxn(&["IC8OOH1-1AR", "O2"], &["IC8OOH1-1AO2R"]),
        rxn(&["IC8-1O2R", "HO2"], &["IC8OOH1", "O2"]),
        rxn(&["IC8-1O2R", "H2O2"], &["IC8OOH1", "HO2"]),
        rxn(&["IC8-1R", "CH3O2"], &["IC8-1OR", "CH3O"]),
        rxn(&["IC8OOH1-1AR"], &["IC4H7OOH", "IC4H9"]),
        rxn(&["IC8OOH1-1AR"], &["CH2O", "I24C7D1", "OH"]),
        rxn(&["IC8-1R", "O2"], &["IC8-1O2R"]),
        rxn(&["IC8-1O2R"], &["IC8OOH1-1AR"]),
        rxn(&["IC8-3O2R"], &["IC8D3", "HO2"]),
        rxn(&["IC8-3R", "O2"], &["IC8D3", "HO2"]),
        rxn(&["IC8", "O2"], &["IC8-1R", "HO2"]),
    ]
}

pub fn ic8_mechanism() -> Mechanism {
    mechanism(ic8_species(), ic8_reactions())
}

/// Third-body fragment of a C5 mechanism.
pub fn nuig_fragment() -> Mechanism {
    mechanism(
        vec![
            spc("H", "H", 2),
            spc("OH", "OH", 2),
            spc("H2O", "H2O", 1),
            spc("AR", "Ar", 1),
            spc("O2", "O2", 3),
            spc("HO2", "HO2", 2),
            spc("HE", "He", 1),
            spc("CH3", "CH3", 2),
            spc("IC4H7", "C4H7", 2),
            spc("AC5H10", "C5H10", 1),
            spc("C5H10-2", "C5H10", 1),
            spc("C4H71-3", "C4H7", 2),
            spc("C5H11-1", "C5H11", 2),
            spc("C2H4", "C2H4", 1),
            spc("NC3H7", "C3H7", 2),
        ],
        vec![
            rxn_tb(&["H", "OH"], &["H2O"], "+M"),
            rxn(&["H", "OH", "AR"], &["H2O", "AR"]),
            rxn_tb(&["H", "O2"], &["HO2"], "(+HE)"),
            rxn_tb(&["CH3", "IC4H7"], &["AC5H10"], "(+M)"),
            rxn_tb(&["C5H10-2"], &["C4H71-3", "CH3"], "(+M)"),
            rxn(&["C5H11-1"], &["C2H4", "NC3H7"]),
        ],
    )
}

pub fn c2h4_species() -> Vec<SpeciesData> {
    vec![
        spc("C2H4", "C2H4", 1),
        spc("H2", "H2", 1),
        spc("H2CC", "C2H2", 1),
        spc("C2H3", "C2H3", 2),
        spc("H", "H", 2),
        spc("C2H5", "C2H5", 2),
        spc("CH2(S)", "CH2", 1),
        spc("CH3", "CH3", 2),
        spc("O", "O", 3),
        spc("HCO", "HCO", 2),
        spc("OH", "OH", 2),
        spc("PC2H4OH", "C2H5O", 2),
        spc("H2O", "H2O", 1),
        spc("O2", "O2", 3),
        spc("HO2", "HO2", 2),
        spc("C2H5O2", "C2H5O2", 2),
        spc("CH4", "CH4", 1),
        spc("C3H4-A", "C3H4", 1),
        spc("CO", "CO", 1),
        spc("C2H6", "C2H6", 1),
        spc("HOCH2CO", "C2H3O2", 2),
        spc("CH2OH", "CH3O", 2),
        spc("C2H3OO", "C2H3O2", 2),
        spc("CH2O", "CH2O", 1),
        spc("C2H2", "C2H2", 1),
        spc("C3H5-A", "C3H5", 2),
        spc("C3H5-T", "C3H5", 2),
        spc("C3H5-S", "C3H5", 2),
        spc("C3H6", "C3H6", 1),
        spc("CC3H6", "C3H6", 1),
        spc("C2H4O1-2", "C2H4O", 1),
        spc("IC3H5OH", "C3H6O", 1),
        spc("NC3H7", "C3H7", 2),
    ]
}

/// Ethylene sub-mechanism, one reaction per PES channel type.
pub fn c2h4_reactions() -> Vec<Reaction> {
    vec![
        rxn_tb(&["C2H4"], &["H2", "H2CC"], "(+M)"),
        rxn_tb(&["C2H3", "H"], &["C2H4"], "(+M)"),
        rxn_tb(&["C2H4", "H"], &["C2H5"], "(+M)"),
        rxn(&["C2H4", "H"], &["C2H3", "H2"]),
        rxn(&["CH2(S)", "CH3"], &["C2H4", "H"]),
        rxn(&["C2H5", "H"], &["C2H4", "H2"]),
        rxn(&["C2H4", "O"], &["CH3", "HCO"]),
        rxn(&["C2H4", "OH"], &["PC2H4OH"]),
        rxn(&["C2H5", "OH"], &["C2H4", "H2O"]),
        rxn(&["C2H4", "O2"], &["C2H3", "HO2"]),
        rxn(&["C2H5O2"], &["C2H4", "HO2"]),
        rxn(&["C2H4", "CH3"], &["C2H3", "CH4"]),
        rxn(&["C3H4-A", "O"], &["C2H4", "CO"]),
    ]
}

pub fn c2h4_mechanism() -> Mechanism {
    mechanism(c2h4_species(), c2h4_reactions())
}

/// Extra C2/C3 reactions exercising the remaining broad classes.
pub fn c2h4_class_reactions() -> Vec<Reaction> {
    vec![
        rxn_tb(&["C2H5", "H"], &["C2H6"], "(+M)"),
        rxn(&["HOCH2CO"], &["CH2OH", "CO"]),
        rxn(&["C2H3OO"], &["CH2O", "HCO"]),
        rxn(&["C2H3", "O2"], &["C2H2", "HO2"]),
        rxn(&["C3H5-A"], &["C3H5-T"]),
        rxn(&["C3H5-A"], &["C3H5-S"]),
        rxn(&["CH3", "CH3"], &["H", "C2H5"]),
    ]
}

/// Reactions around ethylene used for the extended submechanism.
pub fn c2h4_ext_mechanism() -> Mechanism {
    mechanism(
        c2h4_species(),
        vec![
            rxn_tb(&["C2H4", "H"], &["C2H5"], "(+M)"),
            rxn(&["C2H4", "OH"], &["PC2H4OH"]),
            rxn(&["C2H3", "CH3"], &["C3H6"]),
            rxn(&["C2H5", "O2"], &["C2H4O1-2", "OH"]),
            rxn(&["C3H6", "OH"], &["IC3H5OH", "H"]),
            rxn(&["CH3", "CH3"], &["C2H6"]),
            rxn_tb(&["O", "O"], &["O2"], "(+M)"),
            rxn(&["CH2(S)", "C2H4"], &["CC3H6"]),
        ],
    )
}

pub const HOT_BUTENYLS: [&str; 3] = ["C4H71-3", "C4H71-4", "C4H72-2"];

/// Butene H-abstractions feeding hot butenyl radicals and their decompositions.
pub fn butene_prompt_mechanism() -> Mechanism {
    mechanism(
        vec![
            spc("C4H8-1", "C4H8", 1),
            spc("C4H8-2", "C4H8", 1),
            spc("H", "H", 2),
            spc("H2", "H2", 1),
            spc("OH", "OH", 2),
            spc("H2O", "H2O", 1),
            spc("C4H71-3", "C4H7", 2),
            spc("C4H71-4", "C4H7", 2),
            spc("C4H72-2", "C4H7", 2),
            spc("C4H612", "C4H6", 1),
            spc("C2H4", "C2H4", 1),
            spc("C2H3", "C2H3", 2),
            spc("C2H2", "C2H2", 1),
            spc("PC4H9", "C4H9", 2),
            spc("C3H5-A", "C3H5", 2),
            spc("CH3", "CH3", 2),
            spc("NC3H7", "C3H7", 2),
        ],
        vec![
            rxn(&["C4H8-1", "H"], &["C4H71-3", "H2"]),
            rxn(&["C4H8-1", "H"], &["C4H71-4", "H2"]),
            rxn(&["C4H8-1", "H"], &["PC4H9"]),
            rxn(&["C4H8-2", "H"], &["C4H72-2", "H2"]),
            rxn(&["C4H71-3"], &["C4H71-4"]),
            rxn(&["C4H71-4"], &["C4H72-2"]),
            rxn(&["C4H72-2"], &["C4H612", "H"]),
            rxn(&["C4H71-4"], &["C2H4", "C2H3"]),
            rxn(&["C4H8-1", "OH"], &["C4H71-3", "H2O"]),
            rxn(&["C4H71-4", "H"], &["C4H8-1"]),
            rxn(&["C4H8-1"], &["C3H5-A", "CH3"]),
            rxn(&["C2H4", "CH3"], &["NC3H7"]),
            rxn(&["C2H3"], &["C2H2", "H"]),
        ],
    )
}

/// Relative energies (kcal/mol) of the butene system.
pub fn butene_energies() -> std::collections::HashMap<String, f64> {
    [
        ("C4H8-1", 0.0),
        ("C4H8-2", -3.0),
        ("H", 52.0),
        ("H2", 0.0),
        ("OH", 9.0),
        ("H2O", -58.0),
        ("C4H71-3", 30.0),
        ("C4H71-4", 45.0),
        ("C4H72-2", 40.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}
