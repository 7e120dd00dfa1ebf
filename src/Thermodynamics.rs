/// NASA 7-coefficient polynomials: Cp, H and S of species and reaction enthalpies
pub mod nasa7;
