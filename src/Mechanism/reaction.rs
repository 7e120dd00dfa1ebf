use serde::{Deserialize, Serialize};
use std::fmt;

/// Reaction key: ordered reactants, ordered products and the third-body slots
/// exactly as written in the mechanism (`"(+M)"`, `"+M"`, `"(+HE)"` or `None`).
/// Never mutated after parsing; sorting only reorders and annotates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reaction {
    pub reactants: Vec<String>,
    pub products: Vec<String>,
    #[serde(default)]
    pub third_bodies: Vec<Option<String>>,
}

impl Reaction {
    pub fn new(reactants: &[&str], products: &[&str], third_bodies: &[Option<&str>]) -> Self {
        Self {
            reactants: reactants.iter().map(|s| s.to_string()).collect(),
            products: products.iter().map(|s| s.to_string()).collect(),
            third_bodies: third_bodies.iter().map(|tb| tb.map(str::to_string)).collect(),
        }
    }

    pub fn molecularity(&self) -> usize {
        self.reactants.len()
    }

    pub fn third_body(&self) -> Option<&str> {
        self.third_bodies.iter().flatten().next().map(String::as_str)
    }

    pub fn involves(&self, species: &str) -> bool {
        self.reactants.iter().any(|s| s == species) || self.products.iter().any(|s| s == species)
    }

    /// Reactant and product names, reactants first, without repetitions.
    pub fn species(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for s in self.reactants.iter().chain(self.products.iter()) {
            if !out.contains(&s.as_str()) {
                out.push(s.as_str());
            }
        }
        out
    }

    /// Species written on both sides, e.g. an explicit collider in `H+OH+AR=H2O+AR`.
    pub fn spectators(&self) -> Vec<&str> {
        let mut products: Vec<&str> = self.products.iter().map(String::as_str).collect();
        let mut out = Vec::new();
        for r in &self.reactants {
            if let Some(pos) = products.iter().position(|p| *p == r.as_str()) {
                products.remove(pos);
                out.push(r.as_str());
            }
        }
        out
    }

    /// Reactants and products with spectators removed (one occurrence per side each).
    pub fn reacting_sides(&self) -> (Vec<&str>, Vec<&str>) {
        let mut reactants: Vec<&str> = self.reactants.iter().map(String::as_str).collect();
        let mut products: Vec<&str> = self.products.iter().map(String::as_str).collect();
        for s in self.spectators() {
            if let Some(pos) = reactants.iter().position(|r| *r == s) {
                reactants.remove(pos);
            }
            if let Some(pos) = products.iter().position(|p| *p == s) {
                products.remove(pos);
            }
        }
        (reactants, products)
    }

    pub fn reversed(&self) -> Reaction {
        Reaction {
            reactants: self.products.clone(),
            products: self.reactants.clone(),
            third_bodies: self.third_bodies.clone(),
        }
    }

    /// `A+B=C+D` without third bodies, the form used for product-energy-distribution channels.
    pub fn ped_label(&self) -> String {
        format!("{}={}", self.reactants.join("+"), self.products.join("+"))
    }

    fn third_body_suffix(&self) -> String {
        match self.third_body() {
            Some(tb) if tb.starts_with('(') || tb.starts_with('+') => tb.to_string(),
            Some(tb) => format!("+{}", tb),
            None => String::new(),
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tb = self.third_body_suffix();
        write!(
            f,
            "{}{}={}{}",
            self.reactants.join("+"),
            tb,
            self.products.join("+"),
            tb
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn display_forms() {
        let r = Reaction::new(&["H", "O2"], &["HO2"], &[Some("(+HE)")]);
        assert_eq!(r.to_string(), "H+O2(+HE)=HO2(+HE)");
        let r = Reaction::new(&["H", "OH"], &["H2O"], &[Some("+M")]);
        assert_eq!(r.to_string(), "H+OH+M=H2O+M");
        let r = Reaction::new(&["C5H11-1"], &["C2H4", "NC3H7"], &[None]);
        assert_eq!(r.to_string(), "C5H11-1=C2H4+NC3H7");
        assert_eq!(r.ped_label(), "C5H11-1=C2H4+NC3H7");
    }

    #[test]
    fn key_equality_is_structural() {
        let a = Reaction::new(&["H", "O2"], &["OH", "O"], &[None]);
        let b = Reaction::new(&["H", "O2"], &["OH", "O"], &[None]);
        let c = Reaction::new(&["O2", "H"], &["OH", "O"], &[None]);
        let set: HashSet<Reaction> = [a.clone(), b.clone(), c.clone()].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn spectators_are_removed_once() {
        let r = Reaction::new(&["H", "OH", "AR"], &["H2O", "AR"], &[None]);
        assert_eq!(r.spectators(), vec!["AR"]);
        let (rcts, prds) = r.reacting_sides();
        assert_eq!(rcts, vec!["H", "OH"]);
        assert_eq!(prds, vec!["H2O"]);
        assert_eq!(r.species(), vec!["H", "OH", "AR", "H2O"]);
        assert!(r.involves("AR"));
        assert_eq!(r.molecularity(), 3);
    }

    #[test]
    fn reversal_keeps_third_bodies() {
        let r = Reaction::new(&["CH3", "IC4H7"], &["AC5H10"], &[Some("(+M)")]);
        let rev = r.reversed();
        assert_eq!(rev.reactants, vec!["AC5H10"]);
        assert_eq!(rev.third_body(), Some("(+M)"));
        assert_eq!(rev.reversed(), r);
    }
}
