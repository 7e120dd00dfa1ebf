use crate::Kinetics::kinetics::{RateCalculator, RateExpression};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Total-ordered, hashable f64 usable as a map key or a sort key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct F64Wrapper(pub f64);

impl PartialEq for F64Wrapper {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for F64Wrapper {}

impl PartialOrd for F64Wrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for F64Wrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for F64Wrapper {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// numpy-style closeness used to match temperatures between tables
pub fn is_close(a: f64, b: f64) -> bool {
    approx::relative_eq!(a, b, epsilon = 1e-8, max_relative = 1e-5)
}

/// Pressure slot of a k(T,P) table: a pressure in atm or the high-pressure limit.
/// `High` orders after every numeric pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PressureKey {
    Pressure(F64Wrapper),
    High,
}

impl PressureKey {
    pub fn atm(p: f64) -> Self {
        PressureKey::Pressure(F64Wrapper(p))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            PressureKey::Pressure(p) => Some(p.0),
            PressureKey::High => None,
        }
    }
}

impl fmt::Display for PressureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PressureKey::Pressure(p) => write!(f, "{}", p.0),
            PressureKey::High => write!(f, "high"),
        }
    }
}

// map keys in JSON are strings: "high" or a number
impl Serialize for PressureKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PressureKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PressureKeyVisitor;

        impl Visitor<'_> for PressureKeyVisitor {
            type Value = PressureKey;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("\"high\" or a pressure in atm")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<PressureKey, E> {
                if v.eq_ignore_ascii_case("high") {
                    return Ok(PressureKey::High);
                }
                v.trim()
                    .parse::<f64>()
                    .map(PressureKey::atm)
                    .map_err(|_| E::custom(format!("invalid pressure key '{}'", v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<PressureKey, E> {
                Ok(PressureKey::atm(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<PressureKey, E> {
                Ok(PressureKey::atm(v as f64))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<PressureKey, E> {
                Ok(PressureKey::atm(v as f64))
            }
        }

        deserializer.deserialize_any(PressureKeyVisitor)
    }
}

/// Evaluated rate constants: pressure -> (temperatures, k values) of equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KtpTable(pub BTreeMap<PressureKey, (Vec<f64>, Vec<f64>)>);

impl KtpTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pressure: PressureKey, temps: Vec<f64>, ks: Vec<f64>) {
        debug_assert_eq!(temps.len(), ks.len());
        self.0.insert(pressure, (temps, ks));
    }

    pub fn get(&self, pressure: &PressureKey) -> Option<&(Vec<f64>, Vec<f64>)> {
        self.0.get(pressure)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PressureKey, &(Vec<f64>, Vec<f64>))> {
        self.0.iter()
    }

    /// Numeric pressures, ascending; the high-pressure limit is skipped.
    pub fn pressures(&self) -> Vec<f64> {
        self.0.keys().filter_map(PressureKey::value).collect()
    }

    /// k at a temperature matching `temp`, if the pressure and temperature are present.
    pub fn k_at(&self, pressure: &PressureKey, temp: f64) -> Option<f64> {
        let (temps, ks) = self.0.get(pressure)?;
        temps
            .iter()
            .position(|t| is_close(*t, temp))
            .and_then(|i| ks.get(i).copied())
    }

    /// Largest finite rate constant over all pressures and temperatures.
    pub fn max_value(&self) -> Option<f64> {
        self.0
            .values()
            .flat_map(|(_, ks)| ks.iter().copied())
            .filter(|k| k.is_finite())
            .fold(None, |acc: Option<f64>, k| match acc {
                Some(m) if m >= k => Some(m),
                _ => Some(k),
            })
    }
}

/// Temperature/pressure grid used to evaluate parameter-form rate expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateGrid {
    pub temperatures: Vec<f64>,
    pub pressures: Vec<f64>,
}

impl Default for RateGrid {
    fn default() -> Self {
        Self {
            temperatures: vec![500.0, 1000.0, 1500.0],
            pressures: vec![1.0, 10.0, 100.0],
        }
    }
}

/// One rate entry of a reaction: parameters as written in the mechanism or an evaluated table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "form", content = "data")]
pub enum RateEntry {
    Params(RateExpression),
    Table(KtpTable),
}

impl RateEntry {
    pub fn ktp_table(&self, grid: &RateGrid) -> KtpTable {
        match self {
            RateEntry::Table(table) => table.clone(),
            RateEntry::Params(expr) => expr.to_ktp_table(&grid.temperatures, &grid.pressures),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::kinetics::ArrheniusStruct;

    fn table() -> KtpTable {
        let mut t = KtpTable::new();
        t.insert(PressureKey::High, vec![500.0, 1000.0], vec![2.0, 20.0]);
        t.insert(PressureKey::atm(10.0), vec![500.0, 1000.0], vec![1.0, 15.0]);
        t.insert(PressureKey::atm(1.0), vec![500.0, 1000.0], vec![0.5, f64::NAN]);
        t
    }

    #[test]
    fn pressure_keys_order_high_last() {
        let keys: Vec<PressureKey> = table().0.keys().copied().collect();
        assert_eq!(
            keys,
            vec![PressureKey::atm(1.0), PressureKey::atm(10.0), PressureKey::High]
        );
        assert_eq!(table().pressures(), vec![1.0, 10.0]);
    }

    #[test]
    fn lookups_and_max() {
        let t = table();
        assert_eq!(t.k_at(&PressureKey::atm(10.0), 1000.0000001), Some(15.0));
        assert_eq!(t.k_at(&PressureKey::atm(10.0), 700.0), None);
        assert_eq!(t.k_at(&PressureKey::atm(3.0), 500.0), None);
        assert_eq!(t.max_value(), Some(20.0));
        assert_eq!(KtpTable::new().max_value(), None);
    }

    #[test]
    fn json_keys_are_strings() {
        let t = table();
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"high\""));
        assert!(json.contains("\"10\""));
        let back: KtpTable = serde_json::from_str(r#"{"1.0": [[500.0], [3.0]], "high": [[500.0], [4.0]]}"#).unwrap();
        assert_eq!(back.k_at(&PressureKey::atm(1.0), 500.0), Some(3.0));
        assert_eq!(back.k_at(&PressureKey::High, 500.0), Some(4.0));
    }

    #[test]
    fn params_are_evaluated_on_the_grid() {
        let entry = RateEntry::Params(RateExpression::Arrhenius(ArrheniusStruct::new(vec![
            [1.0e13, 0.0, 0.0],
        ])));
        let table = entry.ktp_table(&RateGrid::default());
        let (temps, ks) = table.get(&PressureKey::High).unwrap();
        assert_eq!(temps.len(), 3);
        assert!(ks.iter().all(|k| (*k - 1.0e13).abs() < 1.0));
    }
}
