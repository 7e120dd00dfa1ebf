/// eng
/// Chemical formulas: parsing of formula strings, Hill-notation signatures and molar masses.
pub mod molmass;
/// species of the mechanism with their formulas and spin multiplicities
pub mod species;
/// reaction keys as written in the mechanism: reactants, products and third-body slots
pub mod reaction;
/// rate entries of a reaction: Arrhenius-family parameters or tabulated k(T,P)
pub mod rate_data;
/// eng
/// Ordered storage of the mechanism. Every reaction keeps all its rate entries and its comment,
/// the order of insertion is the order of the mechanism file. The store can be reordered
/// by a list of reaction keys and written to or read from JSON.
pub mod mech_store;
