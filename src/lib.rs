#[allow(non_snake_case)]
pub mod Kinetics;
#[allow(non_snake_case)]
pub mod Mechanism;
#[allow(non_snake_case)]
pub mod Sorter;
#[allow(non_snake_case)]
pub mod Thermodynamics;
#[allow(non_snake_case)]
pub mod Utils;
