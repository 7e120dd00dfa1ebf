use crate::Mechanism::rate_data::{KtpTable, PressureKey};
use enum_dispatch::enum_dispatch;
use log::warn;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Chemkin activation energies are in cal/mol
const R: f64 = 1.987;
// cm3*atm/(mol*K), for the bath-gas concentration of falloff expressions
const R_CONC: f64 = 82.057;

// Rate expressions of a Chemkin mechanism evaluated to k(T,P) tables.
// Pressures are in atm; `None` stands for the high-pressure limit.
#[enum_dispatch]
pub trait RateCalculator {
    fn k_const(&self, temp: f64, pressure: Option<f64>) -> f64;
    fn is_pressure_dependent_form(&self) -> bool;
    fn has_high_limit(&self) -> bool;

    fn to_ktp_table(&self, temps: &[f64], pressures: &[f64]) -> KtpTable {
        let mut table = KtpTable::new();
        let eval = |p: Option<f64>| -> Vec<f64> { temps.iter().map(|t| self.k_const(*t, p)).collect() };
        if self.is_pressure_dependent_form() {
            for p in pressures {
                table.insert(PressureKey::atm(*p), temps.to_vec(), eval(Some(*p)));
            }
        }
        if self.has_high_limit() {
            table.insert(PressureKey::High, temps.to_vec(), eval(None));
        }
        table
    }
}

#[enum_dispatch(RateCalculator)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RateExpression {
    Arrhenius(ArrheniusStruct),
    Plog(PlogStruct),
    Falloff(FalloffStruct),
    Chebyshev(ChebyshevStruct),
}

fn arrhenius_k(params: &[f64; 3], temp: f64) -> f64 {
    let [a, n, e] = *params;
    a * temp.powf(n) * f64::exp(-e / (R * temp))
}

/////////////////////////ELEMENTARY KINETICS///////////////////////////////////////////////////////////////
/// A*T^n*exp(-E/RT); several parameter sets are summed (DUPLICATE reactions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrheniusStruct {
    pub arrhenius: Vec<[f64; 3]>,
}

impl ArrheniusStruct {
    pub fn new(arrhenius: Vec<[f64; 3]>) -> Self {
        Self { arrhenius }
    }
}

impl RateCalculator for ArrheniusStruct {
    fn k_const(&self, temp: f64, _pressure: Option<f64>) -> f64 {
        self.arrhenius.iter().map(|p| arrhenius_k(p, temp)).sum()
    }
    fn is_pressure_dependent_form(&self) -> bool {
        false
    }
    fn has_high_limit(&self) -> bool {
        true
    }
}

/////////////////////////PLOG KINETICS///////////////////////////////////////////////////////////////
/// Arrhenius sets tabulated against pressure; ln k is interpolated linearly in ln P
/// and clamped to the end points outside the tabulated range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlogStruct {
    pub rates: BTreeMap<PressureKey, Vec<[f64; 3]>>,
}

impl PlogStruct {
    pub fn new(rates: BTreeMap<PressureKey, Vec<[f64; 3]>>) -> Self {
        Self { rates }
    }

    fn k_at_key(&self, key: &PressureKey, temp: f64) -> f64 {
        self.rates
            .get(key)
            .map(|sets| sets.iter().map(|p| arrhenius_k(p, temp)).sum())
            .unwrap_or(0.0)
    }
}

impl RateCalculator for PlogStruct {
    fn k_const(&self, temp: f64, pressure: Option<f64>) -> f64 {
        let pressures: Vec<f64> = self.rates.keys().filter_map(PressureKey::value).collect();
        let p = match pressure {
            None if self.has_high_limit() => return self.k_at_key(&PressureKey::High, temp),
            None => match pressures.last() {
                Some(p) => *p,
                None => return 0.0,
            },
            Some(p) => p,
        };
        let (first, last) = match (pressures.first(), pressures.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => {
                warn!("PLOG expression without numeric pressures");
                return 0.0;
            }
        };
        if p <= first {
            return self.k_at_key(&PressureKey::atm(first), temp);
        }
        if p >= last {
            return self.k_at_key(&PressureKey::atm(last), temp);
        }
        let i = pressures.partition_point(|x| *x <= p);
        let (p_lo, p_hi) = (pressures[i - 1], pressures[i]);
        let k_lo = self.k_at_key(&PressureKey::atm(p_lo), temp);
        let k_hi = self.k_at_key(&PressureKey::atm(p_hi), temp);
        if p_lo == p || k_lo <= 0.0 || k_hi <= 0.0 {
            return k_lo;
        }
        let w = (p.ln() - p_lo.ln()) / (p_hi.ln() - p_lo.ln());
        (k_lo.ln() + w * (k_hi.ln() - k_lo.ln())).exp()
    }
    fn is_pressure_dependent_form(&self) -> bool {
        true
    }
    fn has_high_limit(&self) -> bool {
        self.rates.contains_key(&PressureKey::High)
    }
}

/////////////////////////FALLOFF KINETICS///////////////////////////////////////////////////////////////
/// Lindemann falloff, or Troe when 3 or 4 Troe parameters are given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FalloffStruct {
    pub low_rate: [f64; 3],
    pub high_rate: [f64; 3],
    #[serde(default)]
    pub troe: Option<Vec<f64>>,
}

impl FalloffStruct {
    pub fn new(low_rate: [f64; 3], high_rate: [f64; 3], troe: Option<Vec<f64>>) -> Self {
        Self {
            low_rate,
            high_rate,
            troe,
        }
    }

    fn f_cent(&self, temp: f64) -> Option<f64> {
        let troe = self.troe.as_ref()?;
        match troe.len() {
            3 | 4 => {
                let (a, t3, t1) = (troe[0], troe[1], troe[2]);
                let mut fc = (1.0 - a) * f64::exp(-temp / t3) + a * f64::exp(-temp / t1);
                if troe.len() == 4 {
                    fc += f64::exp(-troe[3] / temp);
                }
                Some(fc)
            }
            n => {
                warn!("Troe expression with {} parameters, using Lindemann form", n);
                None
            }
        }
    }
}

impl RateCalculator for FalloffStruct {
    fn k_const(&self, temp: f64, pressure: Option<f64>) -> f64 {
        let k_inf = arrhenius_k(&self.high_rate, temp);
        let p = match pressure {
            Some(p) => p,
            None => return k_inf,
        };
        let k0 = arrhenius_k(&self.low_rate, temp);
        let conc = p / (R_CONC * temp);
        if k_inf <= 0.0 {
            return 0.0;
        }
        let p_r = k0 * conc / k_inf;
        let lindemann = k_inf * p_r / (1.0 + p_r);
        match self.f_cent(temp) {
            Some(fc) if fc > 0.0 && p_r > 0.0 => {
                let log_fc = fc.log10();
                let c = -0.4 - 0.67 * log_fc;
                let n = 0.75 - 1.27 * log_fc;
                let f1 = (p_r.log10() + c) / (n - 0.14 * (p_r.log10() + c));
                lindemann * 10f64.powf(log_fc / (1.0 + f1 * f1))
            }
            _ => lindemann,
        }
    }
    fn is_pressure_dependent_form(&self) -> bool {
        true
    }
    fn has_high_limit(&self) -> bool {
        true
    }
}

/////////////////////////CHEBYSHEV KINETICS///////////////////////////////////////////////////////////////
/// log10 k as a double Chebyshev series in reduced inverse temperature and reduced log pressure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChebyshevStruct {
    pub alpha: DMatrix<f64>,
    pub t_limits: (f64, f64),
    pub p_limits: (f64, f64),
}

impl ChebyshevStruct {
    pub fn new(alpha: DMatrix<f64>, t_limits: (f64, f64), p_limits: (f64, f64)) -> Self {
        Self {
            alpha,
            t_limits,
            p_limits,
        }
    }
}

// limits may come from the parser in either order
fn ordered(limits: (f64, f64)) -> (f64, f64) {
    (limits.0.min(limits.1), limits.0.max(limits.1))
}

fn chebyshev_poly(n: usize, x: f64) -> f64 {
    (n as f64 * x.clamp(-1.0, 1.0).acos()).cos()
}

impl RateCalculator for ChebyshevStruct {
    fn k_const(&self, temp: f64, pressure: Option<f64>) -> f64 {
        let (t_min, t_max) = ordered(self.t_limits);
        let (p_min, p_max) = ordered(self.p_limits);
        let p = pressure.unwrap_or(p_max);
        let p = if p_min <= p_max { p.clamp(p_min, p_max) } else { p };
        let t_red = (2.0 / temp - 1.0 / t_min - 1.0 / t_max) / (1.0 / t_max - 1.0 / t_min);
        let p_red = if p_max > p_min {
            (2.0 * p.log10() - p_min.log10() - p_max.log10()) / (p_max.log10() - p_min.log10())
        } else {
            0.0
        };
        let mut log_k = 0.0;
        for i in 0..self.alpha.nrows() {
            for j in 0..self.alpha.ncols() {
                log_k += self.alpha[(i, j)] * chebyshev_poly(i, t_red) * chebyshev_poly(j, p_red);
            }
        }
        10f64.powf(log_k)
    }
    fn is_pressure_dependent_form(&self) -> bool {
        true
    }
    fn has_high_limit(&self) -> bool {
        false
    }
}
