use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[allow(non_upper_case_globals)]
const R: f64 = 1.987; // cal/(K*mol)

#[derive(Debug, Error, PartialEq)]
pub enum ThermoError {
    #[error("temperature {temperature} K is outside the range {t_low}-{t_high} K")]
    OutOfRange {
        temperature: f64,
        t_low: f64,
        t_high: f64,
    },
    #[error("thermo data of {species}: {source}")]
    Species {
        species: String,
        #[source]
        source: Box<ThermoError>,
    },
}

fn cp(t: f64, a: &[f64; 7]) -> f64 {
    R * (a[0] + a[1] * t + a[2] * t.powi(2) + a[3] * t.powi(3) + a[4] * t.powi(4))
}
fn dh(t: f64, a: &[f64; 7]) -> f64 {
    R * t
        * (a[0]
            + a[1] * t / 2.0
            + a[2] * t.powi(2) / 3.0
            + a[3] * t.powi(3) / 4.0
            + a[4] * t.powi(4) / 5.0
            + a[5] / t)
}
fn ds(t: f64, a: &[f64; 7]) -> f64 {
    R * (a[0] * t.ln()
        + a[1] * t
        + a[2] * t.powi(2) / 2.0
        + a[3] * t.powi(3) / 3.0
        + a[4] * t.powi(4) / 4.0
        + a[6])
}

/// Two-range NASA-7 polynomial as found in the THERMO block of a Chemkin file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nasa7 {
    pub t_low: f64,
    pub t_mid: f64,
    pub t_high: f64,
    pub low: [f64; 7],
    pub high: [f64; 7],
}

impl Nasa7 {
    fn coeffs(&self, t: f64) -> Result<&[f64; 7], ThermoError> {
        if t < self.t_low || t > self.t_high {
            return Err(ThermoError::OutOfRange {
                temperature: t,
                t_low: self.t_low,
                t_high: self.t_high,
            });
        }
        Ok(if t < self.t_mid { &self.low } else { &self.high })
    }

    /// cal/(mol*K)
    pub fn cp(&self, t: f64) -> Result<f64, ThermoError> {
        Ok(cp(t, self.coeffs(t)?))
    }

    /// kcal/mol
    pub fn h(&self, t: f64) -> Result<f64, ThermoError> {
        Ok(dh(t, self.coeffs(t)?) / 1000.0)
    }

    /// cal/(mol*K)
    pub fn s(&self, t: f64) -> Result<f64, ThermoError> {
        Ok(ds(t, self.coeffs(t)?))
    }

    /// kcal/mol
    pub fn g(&self, t: f64) -> Result<f64, ThermoError> {
        Ok(self.h(t)? - t * self.s(t)? / 1000.0)
    }
}

/// Thermo properties of one species tabulated on a temperature grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesThermo {
    pub temps: Vec<f64>,
    pub h: Vec<f64>,
    pub s: Vec<f64>,
    pub cp: Vec<f64>,
    pub g: Vec<f64>,
}

impl SpeciesThermo {
    /// Enthalpy at the tabulated temperature closest to `t`.
    pub fn enthalpy_at(&self, t: f64) -> Option<f64> {
        self.temps
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - t).abs().total_cmp(&(*b - t).abs()))
            .and_then(|(i, _)| self.h.get(i).copied())
    }
}

pub type ThermoTable = BTreeMap<String, SpeciesThermo>;

pub fn species_thermo(poly: &Nasa7, temps: &[f64]) -> Result<SpeciesThermo, ThermoError> {
    let mut out = SpeciesThermo {
        temps: temps.to_vec(),
        h: Vec::with_capacity(temps.len()),
        s: Vec::with_capacity(temps.len()),
        cp: Vec::with_capacity(temps.len()),
        g: Vec::with_capacity(temps.len()),
    };
    for t in temps {
        out.h.push(poly.h(*t)?);
        out.s.push(poly.s(*t)?);
        out.cp.push(poly.cp(*t)?);
        out.g.push(poly.g(*t)?);
    }
    Ok(out)
}

/// Tabulates every species polynomial on `temps`.
pub fn create_spc_therm_dct(
    polys: &BTreeMap<String, Nasa7>,
    temps: &[f64],
) -> Result<ThermoTable, ThermoError> {
    let mut table = ThermoTable::new();
    for (name, poly) in polys {
        let thermo = species_thermo(poly, temps).map_err(|e| ThermoError::Species {
            species: name.clone(),
            source: Box::new(e),
        })?;
        table.insert(name.clone(), thermo);
    }
    info!("thermo table built for {} species at {} temperatures", table.len(), temps.len());
    Ok(table)
}
