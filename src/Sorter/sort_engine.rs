//! # Multi-criteria mechanism sorting
//!
//! [`SortingMech`] reorders the reactions of a [`Mechanism`] by a list of criteria, the
//! first one being the coarsest grouping, and writes a comment for every reaction that
//! records the value of each criterion.
//!
//! ## Example
//! ```rust, ignore
//! use KiSort::Sorter::sort_engine::SortingMech;
//! use KiSort::Sorter::sort_spec::SortSpec;
//! use KiSort::Utils::config::SorterConfig;
//!
//! let spec = SortSpec::from_tokens(&["pes", "subpes", "rxn_class_broad", "0"], &[])?;
//! let config = SorterConfig::default();
//! let result = SortingMech::new(&mech, &config).sort(&spec)?;
//! result.pretty_print();
//! ```
//! Reactions removed by a filtering criterion (`species`, `submech_prompt`) are
//! listed in [`SortResult::excluded`]; the rate entries of the kept ones are never touched.
use crate::Kinetics::pdep::assess_pressure_dependence;
use crate::Mechanism::mech_store::{Mechanism, ReactionRecord};
use crate::Mechanism::molmass::{atom_count, heavy_atom_count};
use crate::Mechanism::rate_data::{F64Wrapper, RateGrid};
use crate::Mechanism::reaction::Reaction;
use crate::Sorter::comments::{CommentColumn, InlineComment, build_comments, format_sci};
use crate::Sorter::pes::{ChannelId, PesDct, PesGrouping};
use crate::Sorter::prompt::{EnergySource, PromptGroup, group_prompt_chains, prompt_tags};
use crate::Sorter::rxn_class::{GraphClassifier, NoGraphClassifier, classify_broad, classify_graph, composite_label};
use crate::Sorter::sort_spec::{SortCriterion, SortSpec};
use crate::Sorter::sorter_error::SorterError;
use crate::Sorter::submech::select_submech;
use crate::Thermodynamics::nasa7::ThermoTable;
use crate::Utils::config::{ChannelNumbering, PromptConfig, SorterConfig};
use log::{debug, info, warn};
use prettytable::{Table, row};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

pub const UNMATCHED: &str = "UNMATCHED";

/// One component of a composite sort key. Every reaction gets the same variant at the
/// same position, so the derived ordering compares like with like.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum KeyPart {
    Index(usize),
    Text(String),
    Ranked(usize, String),
    Descending(Reverse<F64Wrapper>),
}

impl KeyPart {
    fn descending(x: f64) -> Self {
        KeyPart::Descending(Reverse(F64Wrapper(x)))
    }
}

struct Row<'m> {
    record: &'m ReactionRecord,
    key: Vec<KeyPart>,
    channel: Option<ChannelId>,
    /// comment columns per criterion position
    columns: Vec<Vec<CommentColumn>>,
}

#[derive(Debug, Clone)]
pub struct SortResult {
    /// kept reactions in sorted order, rate entries unchanged
    pub mech: Mechanism,
    pub order: Vec<Reaction>,
    /// only for specifications made of `pes`, `subpes` and `chnl`
    pub pes_dct: Option<PesDct>,
    pub comments: HashMap<Reaction, InlineComment>,
    /// only for `submech_prompt` with prompt filter options
    pub pes_groups: Option<Vec<PromptGroup>>,
    pub excluded: Vec<Reaction>,
}

#[derive(Serialize)]
struct SortedEntry<'a> {
    reaction: String,
    #[serde(flatten)]
    comment: Option<&'a InlineComment>,
}

#[derive(Serialize)]
struct SortedOutput<'a> {
    reactions: Vec<SortedEntry<'a>>,
    excluded: Vec<String>,
    pes_groups: Option<&'a [PromptGroup]>,
}

impl SortResult {
    pub fn comment(&self, reaction: &Reaction) -> Option<&InlineComment> {
        self.comments.get(reaction)
    }

    /// Inline comments in output order.
    pub fn inline_comments(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|r| self.comments.get(r).map_or("", |c| c.cmts_inline.as_str()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let output = SortedOutput {
            reactions: self
                .order
                .iter()
                .map(|r| SortedEntry {
                    reaction: r.to_string(),
                    comment: self.comments.get(r),
                })
                .collect(),
            excluded: self.excluded.iter().map(Reaction::to_string).collect(),
            pes_groups: self.pes_groups.as_deref(),
        };
        serde_json::to_string_pretty(&output)
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["#", "Reaction", "Header", "Comment"]);
        for (i, reaction) in self.order.iter().enumerate() {
            let comment = self.comments.get(reaction);
            table.add_row(row![
                i + 1,
                reaction.to_string(),
                comment.and_then(|c| c.cmts_top.clone()).unwrap_or_default(),
                comment.map(|c| c.cmts_inline.clone()).unwrap_or_default()
            ]);
        }
        table
    }

    pub fn pretty_print(&self) {
        self.to_table().printstd();
    }
}

/// Sorting session over one mechanism. Optional collaborators (graph classifier,
/// thermochemistry, prompt filter) are set with the `with_*` builders.
pub struct SortingMech<'a> {
    mech: &'a Mechanism,
    config: SorterConfig,
    graph: Box<dyn GraphClassifier + 'a>,
    thermo: Option<&'a ThermoTable>,
    energies: Option<&'a HashMap<String, f64>>,
    prompt_filter: bool,
    ped_pairs: Option<Vec<(Reaction, String)>>,
}

impl<'a> SortingMech<'a> {
    pub fn new(mech: &'a Mechanism, config: &SorterConfig) -> Self {
        Self {
            mech,
            config: config.clone(),
            graph: Box::new(NoGraphClassifier),
            thermo: None,
            energies: None,
            prompt_filter: false,
            ped_pairs: None,
        }
    }

    pub fn with_graph_classifier(mut self, classifier: impl GraphClassifier + 'a) -> Self {
        self.graph = Box::new(classifier);
        self
    }

    pub fn with_thermo(mut self, thermo: &'a ThermoTable) -> Self {
        self.thermo = Some(thermo);
        self
    }

    pub fn with_energies(mut self, energies: &'a HashMap<String, f64>) -> Self {
        self.energies = Some(energies);
        self
    }

    /// Replaces the `submech_prompt` selection by prompt-dissociation groups, keeping PED
    /// channels that release more than `dh` kcal/mol.
    pub fn with_prompt_filter(mut self, dh: Option<f64>, look_for_prompt_chains: bool) -> Self {
        self.config.prompt.dh = dh;
        self.config.prompt.look_for_prompt_chains = look_for_prompt_chains;
        self.prompt_filter = true;
        self
    }

    pub fn with_ped_pairs(mut self, pairs: Vec<(Reaction, String)>) -> Self {
        self.ped_pairs = Some(pairs);
        self.prompt_filter = true;
        self
    }

    fn validate(spec: &SortSpec) -> Result<(), SorterError> {
        if spec.criteria.is_empty() {
            return Err(SorterError::EmptySpec);
        }
        if spec.isolate_species.is_empty() {
            if let Some(c) = spec.criteria.iter().find(|c| c.needs_isolate_species()) {
                return Err(SorterError::MissingIsolateSpecies(c.to_string()));
            }
        }
        Ok(())
    }

    pub fn sort(&self, spec: &SortSpec) -> Result<SortResult, SorterError> {
        Self::validate(spec)?;
        let criteria = &spec.criteria;
        info!(
            "sorting {} reactions by {:?} ({} header criteria)",
            self.mech.len(),
            criteria.iter().map(SortCriterion::as_str).collect::<Vec<_>>(),
            spec.header_lines
        );

        let needs_pes = criteria
            .iter()
            .any(|c| c.is_pes_family() || *c == SortCriterion::SubmechPrompt);
        let grouping = needs_pes.then(|| PesGrouping::build(self.mech, true, self.config.channel_numbering));

        let submech = spec
            .contains(SortCriterion::Submech)
            .then(|| select_submech(self.mech, &spec.isolate_species, false, self.config.submech.max_depth));
        let submech_ext = spec
            .contains(SortCriterion::SubmechExt)
            .then(|| select_submech(self.mech, &spec.isolate_species, true, self.config.submech.max_depth));

        let mut prompt = None;
        if spec.contains(SortCriterion::SubmechPrompt) {
            if let Some(grouping) = &grouping {
                prompt = Some(self.prompt_selection(grouping, &spec.isolate_species));
            }
        }

        let mut rows = Vec::new();
        let mut excluded = Vec::new();
        for record in self.mech.records() {
            let reaction = &record.reaction;
            let kept_by_species = !spec.contains(SortCriterion::Species)
                || spec.isolate_species.iter().any(|s| reaction.involves(s));
            let kept_by_prompt = prompt.as_ref().is_none_or(|p| p.selects(reaction));
            if kept_by_species && kept_by_prompt {
                rows.push(Row {
                    record,
                    key: Vec::new(),
                    channel: grouping.as_ref().and_then(|g| g.channel_of(reaction)),
                    columns: vec![Vec::new(); criteria.len()],
                });
            } else {
                excluded.push(reaction.clone());
            }
        }
        if !excluded.is_empty() {
            info!("{} reactions excluded by filter criteria", excluded.len());
        }

        let class_position = criteria
            .iter()
            .position(|c| matches!(c, SortCriterion::RxnClassBroad | SortCriterion::RxnClassGraph));
        for (pos, criterion) in criteria.iter().enumerate() {
            debug!("resolving criterion {}", criterion);
            for row in rows.iter_mut() {
                let record: &ReactionRecord = row.record;
                let reaction = &record.reaction;
                match criterion {
                    SortCriterion::Pes => {
                        row.key.push(KeyPart::Index(row.channel.map_or(usize::MAX, |c| c.pes)));
                    }
                    SortCriterion::Subpes => {
                        row.key.push(KeyPart::Index(row.channel.map_or(usize::MAX, |c| c.pes)));
                        row.key.push(KeyPart::Index(row.channel.map_or(usize::MAX, |c| c.subpes)));
                    }
                    SortCriterion::Chnl => {
                        row.key.push(KeyPart::Index(row.channel.map_or(usize::MAX, |c| c.chnl)));
                    }
                    SortCriterion::Mult => {
                        let mult: usize = reaction.reactants.iter().map(|s| self.mech.species.mult(s)).product();
                        row.key.push(KeyPart::Index(mult));
                        row.columns[pos].push(CommentColumn::new("mult", mult.to_string()));
                    }
                    SortCriterion::R1 => {
                        let r1 = self.heaviest_reactant(reaction);
                        row.key.push(KeyPart::Text(r1.clone()));
                        row.columns[pos].push(CommentColumn::new("r1", r1));
                    }
                    SortCriterion::Molecularity => {
                        let nr = reaction.molecularity();
                        row.key.push(KeyPart::Index(nr));
                        row.columns[pos].push(CommentColumn::new("NR", nr.to_string()));
                    }
                    SortCriterion::RxnMaxVals => {
                        let value = max_rate(record, &self.config.rate_grid);
                        row.key.push(KeyPart::descending(value));
                        row.columns[pos].push(CommentColumn::new("maxval", format_sci(value)));
                    }
                    SortCriterion::RxnMaxRatio => {
                        let value = max_ratio(record, &self.config.rate_grid);
                        row.key.push(KeyPart::descending(value));
                        row.columns[pos].push(CommentColumn::new("ratio", format_sci(value)));
                    }
                    SortCriterion::RxnClassBroad | SortCriterion::RxnClassGraph => {
                        let label = match criterion {
                            SortCriterion::RxnClassBroad => classify_broad(reaction, &self.mech.species),
                            _ => classify_graph(self.graph.as_ref(), reaction, &self.mech.species).map_err(|source| {
                                SorterError::Classifier {
                                    reaction: reaction.to_string(),
                                    source,
                                }
                            })?,
                        };
                        row.key.push(KeyPart::Text(label.clone()));
                        let Some(first) = class_position else { continue };
                        match row.columns[first].first_mut() {
                            // graph label goes first in the combined token
                            Some(col) if *criterion == SortCriterion::RxnClassGraph => {
                                col.value = composite_label(&label, &col.value);
                            }
                            Some(col) => col.value = composite_label(&col.value, &label),
                            None => row.columns[first].push(CommentColumn::new("rxntype", label)),
                        }
                    }
                    SortCriterion::Submech | SortCriterion::SubmechExt => {
                        let selection = if *criterion == SortCriterion::Submech {
                            submech.as_ref()
                        } else {
                            submech_ext.as_ref()
                        };
                        let label = selection.and_then(|s| s.label_of(reaction));
                        let (key, token) = submech_key(label);
                        row.key.push(key);
                        row.columns[pos].push(CommentColumn::new("submech", token));
                    }
                    SortCriterion::SubmechPrompt => {
                        if let Some(prompt) = &prompt {
                            let (key, token) = prompt.key_and_token(reaction, row.channel);
                            row.key.extend(key);
                            row.columns[pos].push(CommentColumn::new("submech_prompt", token));
                        }
                    }
                    SortCriterion::Species => {
                        let found = spec
                            .isolate_species
                            .iter()
                            .position(|s| reaction.involves(s))
                            .unwrap_or(usize::MAX);
                        row.key.push(KeyPart::Index(found));
                        if pos < spec.header_lines {
                            if let Some(name) = spec.isolate_species.get(found) {
                                row.columns[pos].push(CommentColumn::new("species", name.clone()));
                            }
                        }
                    }
                    SortCriterion::Pdep => {
                        let pdep = self.is_pressure_dependent(record);
                        row.key.push(KeyPart::Index(if pdep { 0 } else { 1 }));
                        row.columns[pos].push(CommentColumn::new("pdep", if pdep { "pdep" } else { "nopdep" }));
                    }
                }
            }
        }

        rows.sort_by(|a, b| a.key.cmp(&b.key));

        let renumber = criteria.first().is_some_and(SortCriterion::is_pes_family);
        let numbers = pes_numbers(&rows, renumber, self.config.channel_numbering);
        for (row, numbers) in rows.iter_mut().zip(&numbers) {
            if let Some(numbers) = numbers {
                for (pos, column) in pes_columns(criteria, *numbers) {
                    row.columns[pos].push(column);
                }
            }
        }

        let split: Vec<(Vec<CommentColumn>, Vec<CommentColumn>)> = rows
            .iter()
            .map(|row| {
                let n = spec.header_lines.min(row.columns.len());
                (row.columns[..n].concat(), row.columns[n..].concat())
            })
            .collect();
        let originals: Vec<Option<String>> = rows.iter().map(|r| r.record.comment.clone()).collect();
        let order: Vec<Reaction> = rows.iter().map(|r| r.record.reaction.clone()).collect();
        let comments: HashMap<Reaction, InlineComment> = order
            .iter()
            .cloned()
            .zip(build_comments(&split, &originals))
            .collect();

        let sorted = self.mech.reordered(&order)?;
        let pes_dct = match (&grouping, spec.is_pes_only()) {
            (Some(g), true) => Some(g.pes_dct()),
            _ => None,
        };
        info!("sorted mechanism has {} reactions", sorted.len());
        Ok(SortResult {
            mech: sorted,
            order,
            pes_dct,
            comments,
            pes_groups: prompt.and_then(PromptSelection::into_groups),
            excluded,
        })
    }

    fn prompt_selection(&self, grouping: &PesGrouping, hot: &[String]) -> PromptSelection {
        if !self.prompt_filter {
            return PromptSelection::Tags(prompt_tags(grouping, hot));
        }
        let energy = EnergySource {
            thermo: self.thermo,
            energies: self.energies,
            temperature: self.config.prompt.reference_temperature,
        };
        let config: &PromptConfig = &self.config.prompt;
        let groups = group_prompt_chains(self.mech, grouping, hot, config, &energy, self.ped_pairs.as_deref());
        let mut members = HashMap::new();
        for group in &groups {
            for (j, member) in group.members.iter().enumerate() {
                members
                    .entry(member.clone())
                    .or_insert_with(|| (group.grp, j + 1, group.member_label(j)));
            }
        }
        PromptSelection::Groups { groups, members }
    }

    /// Heaviest reactant by stoichiometry: most heavy atoms, then most atoms, then the
    /// first one as written. Species of unknown composition count as empty.
    fn heaviest_reactant(&self, reaction: &Reaction) -> String {
        let species = &self.mech.species;
        let mut best: Option<(&str, (usize, usize))> = None;
        for r in &reaction.reactants {
            let size = species
                .formula(r)
                .map_or((0, 0), |f| (heavy_atom_count(f), atom_count(f)));
            if best.is_none_or(|(_, b)| size > b) {
                best = Some((r.as_str(), size));
            }
        }
        best.map(|(name, _)| name.to_string()).unwrap_or_default()
    }

    fn is_pressure_dependent(&self, record: &ReactionRecord) -> bool {
        let Some(entry) = record.rates.iter().flatten().next() else {
            warn!("no rate data for {}, treated as pressure independent", record.reaction);
            return false;
        };
        let pdep = &self.config.pdep;
        assess_pressure_dependence(
            &entry.ktp_table(&self.config.rate_grid),
            &pdep.check_temperatures,
            pdep.tolerance_pct,
            pdep.p_low,
            pdep.p_high,
        )
    }
}

enum PromptSelection {
    Tags(HashMap<Reaction, String>),
    Groups {
        groups: Vec<PromptGroup>,
        /// first occurrence of each member: (group id, 1-based position, label)
        members: HashMap<Reaction, (usize, usize, String)>,
    },
}

impl PromptSelection {
    fn selects(&self, reaction: &Reaction) -> bool {
        match self {
            PromptSelection::Tags(tags) => tags.contains_key(reaction),
            PromptSelection::Groups { members, .. } => members.contains_key(reaction),
        }
    }

    fn key_and_token(&self, reaction: &Reaction, channel: Option<ChannelId>) -> (Vec<KeyPart>, String) {
        match self {
            PromptSelection::Tags(tags) => {
                let tag = tags.get(reaction).map_or("", String::as_str);
                match channel {
                    Some(c) => (
                        vec![KeyPart::Index(c.pes), KeyPart::Index(c.subpes), KeyPart::Index(c.chnl)],
                        format!("{}.{}.{}.{}", c.pes + 1, c.subpes + 1, c.chnl + 1, tag),
                    ),
                    None => (vec![KeyPart::Index(usize::MAX); 3], format!("...{}", tag)),
                }
            }
            PromptSelection::Groups { members, .. } => match members.get(reaction) {
                Some((grp, j, label)) => (
                    vec![KeyPart::Index(*grp), KeyPart::Index(*j)],
                    format!("{}.{}.{}", grp, j, label),
                ),
                None => (vec![KeyPart::Index(usize::MAX); 2], String::new()),
            },
        }
    }

    fn into_groups(self) -> Option<Vec<PromptGroup>> {
        match self {
            PromptSelection::Groups { groups, .. } => Some(groups),
            PromptSelection::Tags(_) => None,
        }
    }
}

fn submech_key(label: Option<&str>) -> (KeyPart, String) {
    match label {
        Some(label) => (KeyPart::Ranked(0, label.to_string()), label.to_string()),
        None => (KeyPart::Ranked(1, String::new()), UNMATCHED.to_string()),
    }
}

/// Largest rate constant over every entry, pressure and temperature; 0 without data.
fn max_rate(record: &ReactionRecord, grid: &RateGrid) -> f64 {
    let max = record
        .rates
        .iter()
        .flatten()
        .filter_map(|entry| entry.ktp_table(grid).max_value())
        .fold(None, |acc: Option<f64>, k| match acc {
            Some(m) if m >= k => Some(m),
            _ => Some(k),
        });
    if max.is_none() {
        warn!("no rate data for {}, max value set to 0", record.reaction);
    }
    max.unwrap_or(0.0)
}

/// Largest `k(entry 1) / k(entry 0)` over the pressures and temperatures both entries
/// tabulate; 0 when either entry is missing or nothing is shared.
fn max_ratio(record: &ReactionRecord, grid: &RateGrid) -> f64 {
    let (Some(Some(first)), Some(Some(second))) = (record.rates.first(), record.rates.get(1)) else {
        return 0.0;
    };
    let (t0, t1) = (first.ktp_table(grid), second.ktp_table(grid));
    let mut best: Option<f64> = None;
    for (pressure, (temps, ks)) in t0.iter() {
        for (temp, k0) in temps.iter().zip(ks) {
            if *k0 == 0.0 || !k0.is_finite() {
                continue;
            }
            if let Some(k1) = t1.k_at(pressure, *temp) {
                let ratio = k1 / k0;
                if ratio.is_finite() && best.is_none_or(|b| ratio > b) {
                    best = Some(ratio);
                }
            }
        }
    }
    best.unwrap_or(0.0)
}

/// 1-based `(pes, subpes, channel)` of every row. With `renumber` the numbers are
/// assigned densely in output order.
fn pes_numbers(rows: &[Row], renumber: bool, numbering: ChannelNumbering) -> Vec<Option<(usize, usize, usize)>> {
    let mut pes_map: HashMap<usize, usize> = HashMap::new();
    let mut sub_map: HashMap<(usize, usize), usize> = HashMap::new();
    let mut sub_count: HashMap<usize, usize> = HashMap::new();
    let mut chnl_map: HashMap<ChannelId, usize> = HashMap::new();
    let mut chnl_count: HashMap<(usize, Option<usize>), usize> = HashMap::new();
    rows.iter()
        .map(|row| {
            let id = row.channel?;
            if !renumber {
                return Some((id.pes + 1, id.subpes + 1, id.chnl + 1));
            }
            let next = pes_map.len() + 1;
            let pes = *pes_map.entry(id.pes).or_insert(next);
            let sub = *sub_map.entry((id.pes, id.subpes)).or_insert_with(|| {
                let count = sub_count.entry(id.pes).or_insert(0);
                *count += 1;
                *count
            });
            let scope = match numbering {
                ChannelNumbering::PerPes => (id.pes, None),
                ChannelNumbering::PerSubPes => (id.pes, Some(id.subpes)),
            };
            let chnl = *chnl_map.entry(id).or_insert_with(|| {
                let count = chnl_count.entry(scope).or_insert(0);
                *count += 1;
                *count
            });
            Some((pes, sub, chnl))
        })
        .collect()
}

fn pes_columns(criteria: &[SortCriterion], (p, s, c): (usize, usize, usize)) -> Vec<(usize, CommentColumn)> {
    let has_pes = criteria.contains(&SortCriterion::Pes);
    let has_sub = criteria.contains(&SortCriterion::Subpes);
    let mut out = Vec::new();
    for (pos, criterion) in criteria.iter().enumerate() {
        let column = match criterion {
            SortCriterion::Pes => CommentColumn::new("pes", p.to_string()),
            SortCriterion::Subpes if has_pes => CommentColumn::new("subpes", s.to_string()),
            SortCriterion::Subpes => CommentColumn::new("pes.subpes", format!("{}.{}", p, s)),
            SortCriterion::Chnl if has_sub => CommentColumn::new("channel", c.to_string()),
            SortCriterion::Chnl if has_pes => CommentColumn::new("subpes.channel", format!("{}.{}", s, c)),
            SortCriterion::Chnl => CommentColumn::new("pes.subpes.channel", format!("{}.{}.{}", p, s, c)),
            _ => continue,
        };
        out.push((pos, column));
    }
    out
}

/// Sorts `mech` by `spec` with the default collaborators.
pub fn sorted_mech(mech: &Mechanism, spec: &SortSpec, config: &SorterConfig) -> Result<SortResult, SorterError> {
    SortingMech::new(mech, config).sort(spec)
}

/// PES dictionary of `mech` with sub-PES splitting.
pub fn sorted_pes_dct(mech: &Mechanism, spec: &SortSpec, config: &SorterConfig) -> Result<PesDct, SorterError> {
    SortingMech::validate(spec)?;
    Ok(PesGrouping::build(mech, true, config.channel_numbering).pes_dct())
}

/// Applies an ordering computed elsewhere; every key must belong to `mech`.
pub fn reordered_mech(mech: &Mechanism, order: &[Reaction]) -> Result<Mechanism, SorterError> {
    Ok(mech.reordered(order)?)
}

