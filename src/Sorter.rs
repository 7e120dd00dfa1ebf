/// eng
/// Grouping of reactions into potential-energy surfaces (PES), sub-PESs linked through shared
/// unimolecular wells and numbered channels. Produces the PES dictionary.
pub mod pes;
/// broad and structural (graph) reaction classes
pub mod rxn_class;
/// eng
/// Fuel submechanism selection: every species is typed relative to the isolated fuels
/// (FUEL, FUEL_RAD, R_O2, SUBFUEL...) and every reaction gets the label of its heaviest
/// typed reactant.
pub mod submech;
/// prompt-dissociation channels: hot radicals formed by abstractions and their decompositions
pub mod prompt;
/// sort criteria and the sort specification (token list or sort input file)
pub mod sort_spec;
/// comment columns, headers and inline comments of sorted reactions
pub mod comments;
/// eng
/// The sorting session: builds the keys of every criterion, orders the mechanism stably,
/// writes the comments and returns the reordered mechanism with the PES dictionary
/// or the prompt groups when they were requested.
/// # Examples
/// ```
/// use KiSort::Mechanism::mech_store::Mechanism;
/// use KiSort::Mechanism::reaction::Reaction;
/// use KiSort::Mechanism::species::{SpeciesData, SpeciesTable};
/// use KiSort::Sorter::sort_engine::sorted_mech;
/// use KiSort::Sorter::sort_spec::SortSpec;
/// use KiSort::Utils::config::SorterConfig;
///
/// let species: SpeciesTable = vec![
///     SpeciesData::from_formula_str("H", "H", 2).unwrap(),
///     SpeciesData::from_formula_str("O2", "O2", 3).unwrap(),
///     SpeciesData::from_formula_str("HO2", "HO2", 2).unwrap(),
///     SpeciesData::from_formula_str("H2O2", "H2O2", 1).unwrap(),
///     SpeciesData::from_formula_str("OH", "OH", 2).unwrap(),
/// ]
/// .into_iter()
/// .collect();
/// let mut mech = Mechanism::new(species);
/// mech.add_reaction(Reaction::new(&["H", "O2"], &["HO2"], &[Some("(+M)")]), None);
/// mech.add_reaction(Reaction::new(&["H2O2"], &["OH", "OH"], &[Some("(+M)")]), None);
///
/// let spec = SortSpec::from_tokens(&["mult", "0"], &[]).unwrap();
/// let result = sorted_mech(&mech, &spec, &SorterConfig::default()).unwrap();
/// assert_eq!(result.inline_comments(), vec!["! mult  1", "! mult  6"]);
/// ```
pub mod sort_engine;
pub mod sorter_error;
#[cfg(test)]
pub mod test_fixtures;
