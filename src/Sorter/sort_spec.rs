//! Sort criteria and the sort specification.
//!
//! A specification is an ordered list of criteria, the first being the coarsest grouping.
//! It is written either as a token list (`["subpes", "chnl", "0"]`, where a trailing integer
//! is the number of leading criteria printed as group headers) or as a sort input file:
//!
//! ```text
//! isolate_species
//!     IC8
//! end isolate_species
//!
//! sort_mech
//!     criteria = [submech, subpes, rxn_class_broad]
//!     n_criteria_headers = 0
//! end sort_mech
//! ```
use crate::Sorter::sorter_error::SorterError;
use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCriterion {
    Pes,
    Subpes,
    Chnl,
    Mult,
    R1,
    Molecularity,
    RxnMaxVals,
    RxnMaxRatio,
    RxnClassBroad,
    RxnClassGraph,
    Submech,
    SubmechExt,
    SubmechPrompt,
    Species,
    Pdep,
}

impl SortCriterion {
    pub const ALL: [SortCriterion; 15] = [
        SortCriterion::Pes,
        SortCriterion::Subpes,
        SortCriterion::Chnl,
        SortCriterion::Mult,
        SortCriterion::R1,
        SortCriterion::Molecularity,
        SortCriterion::RxnMaxVals,
        SortCriterion::RxnMaxRatio,
        SortCriterion::RxnClassBroad,
        SortCriterion::RxnClassGraph,
        SortCriterion::Submech,
        SortCriterion::SubmechExt,
        SortCriterion::SubmechPrompt,
        SortCriterion::Species,
        SortCriterion::Pdep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriterion::Pes => "pes",
            SortCriterion::Subpes => "subpes",
            SortCriterion::Chnl => "chnl",
            SortCriterion::Mult => "mult",
            SortCriterion::R1 => "r1",
            SortCriterion::Molecularity => "molecularity",
            SortCriterion::RxnMaxVals => "rxn_max_vals",
            SortCriterion::RxnMaxRatio => "rxn_max_ratio",
            SortCriterion::RxnClassBroad => "rxn_class_broad",
            SortCriterion::RxnClassGraph => "rxn_class_graph",
            SortCriterion::Submech => "submech",
            SortCriterion::SubmechExt => "submech_ext",
            SortCriterion::SubmechPrompt => "submech_prompt",
            SortCriterion::Species => "species",
            SortCriterion::Pdep => "pdep",
        }
    }

    pub fn is_pes_family(&self) -> bool {
        matches!(self, SortCriterion::Pes | SortCriterion::Subpes | SortCriterion::Chnl)
    }

    pub fn needs_isolate_species(&self) -> bool {
        matches!(
            self,
            SortCriterion::Submech | SortCriterion::SubmechExt | SortCriterion::SubmechPrompt | SortCriterion::Species
        )
    }
}

impl FromStr for SortCriterion {
    type Err = SorterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortCriterion::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| SorterError::UnknownCriterion(s.to_string()))
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub criteria: Vec<SortCriterion>,
    /// leading criteria printed as group headers instead of inline
    pub header_lines: usize,
    pub isolate_species: Vec<String>,
}

impl SortSpec {
    pub fn new(criteria: Vec<SortCriterion>, header_lines: usize, isolate_species: &[&str]) -> Self {
        Self {
            criteria,
            header_lines,
            isolate_species: isolate_species.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Criterion names with an optional trailing header count.
    pub fn from_tokens(tokens: &[&str], isolate_species: &[&str]) -> Result<Self, SorterError> {
        let (names, header_lines) = match tokens.split_last() {
            Some((last, rest)) => match last.trim().parse::<usize>() {
                Ok(n) => (rest, n),
                Err(_) => (tokens, 0),
            },
            None => return Err(SorterError::EmptySpec),
        };
        let criteria = names
            .iter()
            .map(|t| t.trim().parse::<SortCriterion>())
            .collect::<Result<Vec<_>, _>>()?;
        if criteria.is_empty() {
            return Err(SorterError::EmptySpec);
        }
        Ok(Self::new(criteria, header_lines, isolate_species))
    }

    /// Reads the `isolate_species` and `sort_mech` blocks of a sort input file.
    pub fn parse_sort_input(text: &str) -> Result<Self, SorterError> {
        let block = |name: &str| -> Result<Option<String>, SorterError> {
            let re = Regex::new(&format!(r"(?s)\b{}\b(.*?)\bend\b", name))
                .map_err(|e| SorterError::SortInput(e.to_string()))?;
            Ok(re.captures(text).map(|c| c[1].to_string()))
        };
        let sort_block = block("sort_mech")?
            .ok_or_else(|| SorterError::SortInput("missing sort_mech block".to_string()))?;

        let criteria_re = Regex::new(r"criteria\s*=\s*\[(.*?)\]").map_err(|e| SorterError::SortInput(e.to_string()))?;
        let criteria_str = criteria_re
            .captures(&sort_block)
            .map(|c| c[1].to_string())
            .ok_or_else(|| SorterError::SortInput("missing criteria list".to_string()))?;
        let headers_re =
            Regex::new(r"n_criteria_headers\s*=\s*(\d+)").map_err(|e| SorterError::SortInput(e.to_string()))?;
        let header_lines = match headers_re.captures(&sort_block) {
            Some(c) => c[1]
                .parse::<usize>()
                .map_err(|e| SorterError::SortInput(e.to_string()))?,
            None => 0,
        };

        let criteria = criteria_str
            .split(',')
            .map(|t| t.trim().trim_matches(|c| c == '\'' || c == '"'))
            .filter(|t| !t.is_empty())
            .map(str::parse::<SortCriterion>)
            .collect::<Result<Vec<_>, _>>()?;
        if criteria.is_empty() {
            return Err(SorterError::EmptySpec);
        }

        let isolate_species: Vec<String> = block("isolate_species")?
            .map(|b| {
                b.split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        info!(
            "sort input: criteria {:?}, {} header criteria, isolate {:?}",
            criteria, header_lines, isolate_species
        );
        Ok(Self {
            criteria,
            header_lines,
            isolate_species,
        })
    }

    pub fn contains(&self, criterion: SortCriterion) -> bool {
        self.criteria.contains(&criterion)
    }

    /// Only `pes`, `subpes` and `chnl`: the PES dictionary is returned as well.
    pub fn is_pes_only(&self) -> bool {
        self.criteria.iter().all(SortCriterion::is_pes_family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_with_header_count() {
        let spec = SortSpec::from_tokens(&["subpes", "chnl", "0"], &[]).unwrap();
        assert_eq!(spec.criteria, vec![SortCriterion::Subpes, SortCriterion::Chnl]);
        assert_eq!(spec.header_lines, 0);
        assert!(spec.is_pes_only());

        let spec = SortSpec::from_tokens(&["species", "subpes", "1"], &["IC8", "IC8-1R"]).unwrap();
        assert_eq!(spec.header_lines, 1);
        assert_eq!(spec.isolate_species, vec!["IC8", "IC8-1R"]);
        assert!(!spec.is_pes_only());

        let spec = SortSpec::from_tokens(&["mult"], &[]).unwrap();
        assert_eq!(spec.header_lines, 0);
    }

    #[test]
    fn unknown_and_empty_specs() {
        assert!(matches!(
            SortSpec::from_tokens(&["pes", "by_colour", "0"], &[]),
            Err(SorterError::UnknownCriterion(t)) if t == "by_colour"
        ));
        assert!(matches!(SortSpec::from_tokens(&["0"], &[]), Err(SorterError::EmptySpec)));
        assert!(matches!(SortSpec::from_tokens(&[], &[]), Err(SorterError::EmptySpec)));
    }

    #[test]
    fn every_name_round_trips() {
        for c in SortCriterion::ALL {
            assert_eq!(c.as_str().parse::<SortCriterion>().unwrap(), c);
        }
    }

    #[test]
    fn sort_input_file() {
        let text = "
isolate_species
    C2H4
end isolate_species

sort_mech
    criteria = [pes, subpes, molecularity, rxn_class_broad]
    n_criteria_headers = 0
end sort_mech
";
        let spec = SortSpec::parse_sort_input(text).unwrap();
        assert_eq!(
            spec.criteria,
            vec![
                SortCriterion::Pes,
                SortCriterion::Subpes,
                SortCriterion::Molecularity,
                SortCriterion::RxnClassBroad
            ]
        );
        assert_eq!(spec.isolate_species, vec!["C2H4"]);
        assert_eq!(spec.header_lines, 0);

        let quoted = "sort_mech\n criteria = ['mult', \"r1\"]\n n_criteria_headers = 2\nend";
        let spec = SortSpec::parse_sort_input(quoted).unwrap();
        assert_eq!(spec.criteria, vec![SortCriterion::Mult, SortCriterion::R1]);
        assert_eq!(spec.header_lines, 2);
        assert!(spec.isolate_species.is_empty());

        assert!(matches!(
            SortSpec::parse_sort_input("isolate_species\n H2\nend"),
            Err(SorterError::SortInput(_))
        ));
        assert!(matches!(
            SortSpec::parse_sort_input("sort_mech\n criteria = [pes, colour]\nend"),
            Err(SorterError::UnknownCriterion(_))
        ));
    }
}
