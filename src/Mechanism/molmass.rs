/// Module to parse chemical formulas, build Hill-notation signatures and compute molar masses
///
/// Formulas are kept as ordered maps element -> atom count so that every derived
/// string (signatures, labels) is reproducible between runs.
use std::collections::BTreeMap;
use thiserror::Error;

pub type Formula = BTreeMap<String, usize>;

#[derive(Debug, Error, PartialEq)]
pub enum FormulaError {
    #[error("empty formula")]
    Empty,
    #[error("unknown element '{0}'")]
    UnknownElement(String),
    #[error("unbalanced parentheses in formula '{0}'")]
    UnbalancedParentheses(String),
    #[error("unexpected character '{ch}' in formula '{formula}'")]
    UnexpectedChar { ch: char, formula: String },
}

// atomic masses, g/mol
const ELEMENTS: &[(&str, f64)] = &[
    ("H", 1.008),
    ("He", 4.0026),
    ("Li", 6.94),
    ("Be", 9.0122),
    ("B", 10.81),
    ("C", 12.011),
    ("N", 14.007),
    ("O", 15.999),
    ("F", 18.998),
    ("Ne", 20.18),
    ("Na", 22.99),
    ("Mg", 24.305),
    ("Al", 26.98),
    ("Si", 28.085),
    ("P", 30.974),
    ("S", 32.065),
    ("Cl", 35.453),
    ("Ar", 39.948),
    ("K", 39.098),
    ("Ca", 40.078),
    ("Fe", 55.845),
    ("Br", 79.904),
    ("Kr", 83.798),
    ("I", 126.904),
    ("Xe", 131.293),
];

pub fn element_mass(symbol: &str) -> Option<f64> {
    ELEMENTS
        .iter()
        .find(|(name, _)| *name == symbol)
        .map(|(_, mass)| *mass)
}

/// Parses formulas like "C8H17O2", "CH3(CH2)2OH" or "Ar" into element counts.
pub fn parse_formula(formula: &str) -> Result<Formula, FormulaError> {
    let trimmed = formula.trim();
    if trimmed.is_empty() {
        return Err(FormulaError::Empty);
    }
    let chars: Vec<char> = trimmed.chars().collect();
    let mut pos = 0;
    let counts = parse_group(&chars, &mut pos, trimmed, 0)?;
    if pos != chars.len() {
        return Err(FormulaError::UnbalancedParentheses(trimmed.to_string()));
    }
    Ok(counts)
}

fn parse_group(
    chars: &[char],
    pos: &mut usize,
    formula: &str,
    depth: usize,
) -> Result<Formula, FormulaError> {
    let mut counts = Formula::new();
    while *pos < chars.len() {
        let ch = chars[*pos];
        if ch == '(' {
            *pos += 1;
            let inner = parse_group(chars, pos, formula, depth + 1)?;
            if *pos >= chars.len() || chars[*pos] != ')' {
                return Err(FormulaError::UnbalancedParentheses(formula.to_string()));
            }
            *pos += 1;
            let mult = read_count(chars, pos);
            for (el, n) in inner {
                *counts.entry(el).or_insert(0) += n * mult;
            }
        } else if ch == ')' {
            if depth == 0 {
                return Err(FormulaError::UnbalancedParentheses(formula.to_string()));
            }
            return Ok(counts);
        } else if ch.is_ascii_uppercase() {
            let mut symbol = ch.to_string();
            *pos += 1;
            while *pos < chars.len() && chars[*pos].is_ascii_lowercase() {
                symbol.push(chars[*pos]);
                *pos += 1;
            }
            if element_mass(&symbol).is_none() {
                return Err(FormulaError::UnknownElement(symbol));
            }
            let n = read_count(chars, pos);
            *counts.entry(symbol).or_insert(0) += n;
        } else {
            return Err(FormulaError::UnexpectedChar {
                ch,
                formula: formula.to_string(),
            });
        }
    }
    if depth > 0 {
        return Err(FormulaError::UnbalancedParentheses(formula.to_string()));
    }
    Ok(counts)
}

fn read_count(chars: &[char], pos: &mut usize) -> usize {
    let start = *pos;
    while *pos < chars.len() && chars[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if start == *pos {
        1
    } else {
        chars[start..*pos]
            .iter()
            .collect::<String>()
            .parse::<usize>()
            .unwrap_or(1)
    }
}

/// Hill notation: carbon first, hydrogen second, the rest alphabetically.
/// Without carbon every element goes alphabetically.
pub fn hill_formula(formula: &Formula) -> String {
    let mut out = String::new();
    let mut push = |el: &str, n: usize| {
        if n == 0 {
            return;
        }
        out.push_str(el);
        if n > 1 {
            out.push_str(&n.to_string());
        }
    };
    let has_carbon = formula.get("C").copied().unwrap_or(0) > 0;
    if has_carbon {
        push("C", formula["C"]);
        if let Some(&h) = formula.get("H") {
            push("H", h);
        }
        for (el, &n) in formula.iter() {
            if el != "C" && el != "H" {
                push(el, n);
            }
        }
    } else {
        for (el, &n) in formula.iter() {
            push(el, n);
        }
    }
    out
}

pub fn add_formulas(a: &Formula, b: &Formula) -> Formula {
    let mut sum = a.clone();
    for (el, n) in b {
        *sum.entry(el.clone()).or_insert(0) += n;
    }
    sum.retain(|_, n| *n > 0);
    sum
}

/// `a - b`, `None` when `b` holds more of some element than `a`.
pub fn subtract_formulas(a: &Formula, b: &Formula) -> Option<Formula> {
    let mut diff = a.clone();
    for (el, n) in b {
        let have = diff.get_mut(el)?;
        if *have < *n {
            return None;
        }
        *have -= n;
    }
    diff.retain(|_, n| *n > 0);
    Some(diff)
}

pub fn sum_formulas<'a, I>(formulas: I) -> Formula
where
    I: IntoIterator<Item = &'a Formula>,
{
    formulas
        .into_iter()
        .fold(Formula::new(), |acc, f| add_formulas(&acc, f))
}

/// Atoms other than hydrogen.
pub fn heavy_atom_count(formula: &Formula) -> usize {
    formula.iter().filter(|(el, _)| el.as_str() != "H").map(|(_, n)| n).sum()
}

pub fn atom_count(formula: &Formula) -> usize {
    formula.values().sum()
}

pub fn molar_mass(formula: &Formula) -> Result<f64, FormulaError> {
    let mut mass = 0.0;
    for (el, n) in formula {
        let m = element_mass(el).ok_or_else(|| FormulaError::UnknownElement(el.clone()))?;
        mass += m * (*n as f64);
    }
    Ok(mass)
}
