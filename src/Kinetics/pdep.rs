//! Pressure-dependence assessment of evaluated rate tables.
//!
//! A reaction is pressure dependent when, at some check temperature present at both
//! bounding pressures, the rate constant changes by more than a tolerance (in %)
//! between the low and the high pressure. Missing data never raises: the reaction
//! is then reported as pressure independent.
use crate::Mechanism::rate_data::{KtpTable, PressureKey};
use log::debug;

pub fn assess_pressure_dependence(
    table: &KtpTable,
    check_temps: &[f64],
    tolerance_pct: f64,
    p_low: Option<f64>,
    p_high: Option<f64>,
) -> bool {
    let pressures = table.pressures();
    let (p_low, p_high) = match (
        p_low.or_else(|| pressures.first().copied()),
        p_high.or_else(|| pressures.last().copied()),
    ) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => return false,
    };
    let (low, high) = (PressureKey::atm(p_low), PressureKey::atm(p_high));
    if table.get(&low).is_none() || table.get(&high).is_none() {
        debug!("pressures {} / {} not tabulated, assuming no pressure dependence", p_low, p_high);
        return false;
    }
    check_temps.iter().any(|temp| {
        match (table.k_at(&low, *temp), table.k_at(&high, *temp)) {
            (Some(k_low), Some(k_high)) if k_low != 0.0 && k_low.is_finite() && k_high.is_finite() => {
                ((k_low - k_high).abs() / k_low.abs()) * 100.0 > tolerance_pct
            }
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pressure_table(k_low: &[f64], k_high: &[f64]) -> KtpTable {
        let temps = vec![400.0, 800.0, 1200.0];
        let mut t = KtpTable::new();
        t.insert(PressureKey::atm(1.0), temps.clone(), k_low.to_vec());
        t.insert(PressureKey::atm(10.0), temps, k_high.to_vec());
        t
    }

    #[test]
    fn identical_rates_are_pressure_independent() {
        let t = two_pressure_table(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!(!assess_pressure_dependence(&t, &[400.0, 800.0, 1200.0], 20.0, None, None));
    }

    #[test]
    fn doubled_rate_is_pressure_dependent() {
        let t = two_pressure_table(&[1.0, 2.0, 3.0], &[1.0, 4.0, 3.0]);
        assert!(assess_pressure_dependence(&t, &[400.0, 800.0, 1200.0], 20.0, None, None));
        // only probing the unchanged temperature
        assert!(!assess_pressure_dependence(&t, &[400.0], 20.0, None, None));
    }

    #[test]
    fn reference_rate_at_400_kelvin() {
        let t = two_pressure_table(&[5.14854e-13, 1.0e-12, 2.0e-12], &[5.14854e-13, 1.0e-12, 2.0e-12]);
        assert!(!assess_pressure_dependence(&t, &[400.0], 20.0, None, None));
    }

    #[test]
    fn tolerance_is_a_strict_bound() {
        let t = two_pressure_table(&[1.0, 1.0, 1.0], &[1.2, 1.2, 1.2]);
        assert!(!assess_pressure_dependence(&t, &[800.0], 25.0, None, None));
        assert!(assess_pressure_dependence(&t, &[800.0], 10.0, None, None));
    }

    #[test]
    fn missing_data_means_independent() {
        let t = two_pressure_table(&[1.0, 1.0, 1.0], &[5.0, 5.0, 5.0]);
        // bound not tabulated
        assert!(!assess_pressure_dependence(&t, &[400.0], 20.0, Some(0.1), None));
        // check temperature not tabulated
        assert!(!assess_pressure_dependence(&t, &[300.0], 20.0, None, None));
        // only the high-pressure limit
        let mut high_only = KtpTable::new();
        high_only.insert(PressureKey::High, vec![400.0], vec![1.0]);
        assert!(!assess_pressure_dependence(&high_only, &[400.0], 20.0, None, None));
    }

    #[test]
    fn zero_low_pressure_rate_is_skipped() {
        let t = two_pressure_table(&[0.0, 1.0, 1.0], &[5.0, 1.0, 1.0]);
        assert!(!assess_pressure_dependence(&t, &[400.0, 800.0], 20.0, None, None));
    }

    #[test]
    fn explicit_bounds_pick_inner_pressures() {
        let temps = vec![500.0];
        let mut t = KtpTable::new();
        t.insert(PressureKey::atm(0.1), temps.clone(), vec![1.0]);
        t.insert(PressureKey::atm(1.0), temps.clone(), vec![2.0]);
        t.insert(PressureKey::atm(10.0), temps.clone(), vec![2.1]);
        t.insert(PressureKey::High, temps, vec![9.0]);
        assert!(assess_pressure_dependence(&t, &[500.0], 20.0, None, None));
        assert!(!assess_pressure_dependence(&t, &[500.0], 20.0, Some(1.0), Some(10.0)));
    }
}
