/// eng
/// Rate expressions of the Chemkin family (Arrhenius, falloff, PLOG, Chebyshev) and their
/// evaluation on a temperature/pressure grid into k(T,P) tables.
pub mod kinetics;
/// checks whether an evaluated rate table changes with pressure
pub mod pdep;
