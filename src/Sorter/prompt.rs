//! # Prompt dissociation
//!
//! Radicals formed by an exothermic abstraction can carry enough internal energy to
//! dissociate before they thermalize. This module finds the reactions involved:
//!
//! * [`prompt_tags`] selects every sub-PES touching one of the hot radicals and tags its
//!   channels as radical decompositions (`RAD_DECO_<R>`) or radical-forming/consuming
//!   steps (`RAD_GEN_<R>`);
//! * [`group_prompt_chains`] pairs each energy-releasing channel (the PED channel, where
//!   the product energy distribution is computed) with the dissociation reactions of
//!   its hot product, one [`PromptGroup`] per PES of PED channels.
use crate::Mechanism::mech_store::Mechanism;
use crate::Mechanism::reaction::Reaction;
use crate::Sorter::pes::{ChannelId, PesGrouping};
use crate::Thermodynamics::nasa7::ThermoTable;
use crate::Utils::config::PromptConfig;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// One prompt-dissociation group: the PED channels of one PES followed by the
/// dissociation reactions of their hot products, each listed with the radical it
/// dissociates. `members` (mechanism keys), `idxs`, `peds` and `hot` are aligned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptGroup {
    pub grp: usize,
    /// `"pes:subpes"`, 1-based
    pub idxs: Vec<String>,
    pub members: Vec<Reaction>,
    pub peds: Vec<Vec<String>>,
    pub hot: Vec<Vec<String>>,
    pub modeltype: String,
}

impl PromptGroup {
    fn new(grp: usize, modeltype: &str) -> Self {
        Self {
            grp,
            idxs: Vec::new(),
            members: Vec::new(),
            peds: Vec::new(),
            hot: Vec::new(),
            modeltype: modeltype.to_string(),
        }
    }

    fn push(&mut self, id: (usize, usize), member: &Reaction, peds: Vec<String>, hot: Vec<String>) {
        self.idxs.push(format!("{}:{}", id.0 + 1, id.1 + 1));
        self.members.push(member.clone());
        self.peds.push(peds);
        self.hot.push(hot);
        self.assert_aligned();
    }

    pub fn assert_aligned(&self) {
        let n = self.members.len();
        assert!(
            self.idxs.len() == n && self.peds.len() == n && self.hot.len() == n,
            "prompt group {} is not aligned",
            self.grp
        );
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// PED label of a member, or its hot species joined by `+`.
    pub fn member_label(&self, i: usize) -> String {
        match self.peds[i].first() {
            Some(ped) => ped.clone(),
            None => self.hot[i].join("+"),
        }
    }
}

/// Species energies in kcal/mol. A reaction is evaluated with thermo enthalpies at the
/// reference temperature when the table covers all of its reacting species, otherwise
/// with the plain energy map; the two sources are never mixed within one reaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergySource<'a> {
    pub thermo: Option<&'a ThermoTable>,
    pub energies: Option<&'a HashMap<String, f64>>,
    pub temperature: f64,
}

impl EnergySource<'_> {
    fn enthalpy(&self, species: &str) -> Option<f64> {
        self.thermo?.get(species)?.enthalpy_at(self.temperature)
    }

    /// `sum E(reactants) - sum E(products)` over the reacting species.
    pub fn energy_release(&self, reaction: &Reaction) -> Option<f64> {
        let (reactants, products) = reaction.reacting_sides();
        let use_thermo = self.thermo.is_some()
            && reactants
                .iter()
                .chain(products.iter())
                .all(|s| self.enthalpy(s).is_some());
        let energy = |s: &str| -> Option<f64> {
            if use_thermo {
                self.enthalpy(s)
            } else {
                self.energies?.get(s).copied()
            }
        };
        let side = |names: &[&str]| -> Option<f64> { names.iter().map(|&s| energy(s)).sum() };
        Some(side(&reactants)? - side(&products)?)
    }
}

fn decomposes(reaction: &Reaction, radical: &str) -> bool {
    let (reactants, products) = reaction.reacting_sides();
    (reactants == [radical] && products.len() >= 2) || (products == [radical] && reactants.len() >= 2)
}

/// Tag of one reaction with respect to the hot radicals; empty when none is involved.
pub fn prompt_tag(reaction: &Reaction, hot: &[String]) -> String {
    if let Some(h) = hot.iter().find(|h| decomposes(reaction, h)) {
        return format!("RAD_DECO_{}", h);
    }
    match hot.iter().find(|h| reaction.involves(h)) {
        Some(h) => format!("RAD_GEN_{}", h),
        None => String::new(),
    }
}

/// Tags of the reactions of every sub-PES involving a hot radical; reactions outside
/// those sub-PESs are absent.
pub fn prompt_tags(pes: &PesGrouping, hot: &[String]) -> HashMap<Reaction, String> {
    let mut tags = HashMap::new();
    for (pes_idx, sub, members) in pes.iter_subpes() {
        if !members.iter().any(|r| hot.iter().any(|h| r.involves(h))) {
            continue;
        }
        debug!("sub-PES {}:{} selected for prompt dissociation", pes_idx + 1, sub + 1);
        for r in members {
            tags.insert(r.clone(), prompt_tag(r, hot));
        }
    }
    info!("{} reactions selected around hot radicals {:?}", tags.len(), hot);
    tags
}

struct PedSeed {
    id: ChannelId,
    key: Reaction,
    oriented: Reaction,
    radical: String,
}

/// Every reaction dissociating `radical`, in channel order.
fn dissociations<'a>(pes: &'a PesGrouping, radical: &str) -> Vec<(ChannelId, &'a Reaction)> {
    let mut out: Vec<(ChannelId, &Reaction)> = pes
        .iter_subpes()
        .flat_map(|(_, _, members)| members.iter())
        .filter(|r| decomposes(r, radical))
        .filter_map(|r| pes.channel_of(r).map(|id| (id, r)))
        .collect();
    out.sort_by_key(|(id, _)| *id);
    out
}

fn ped_candidates(mech: &Mechanism, hot: &[String]) -> Vec<(Reaction, Reaction, String)> {
    let mut out = Vec::new();
    for reaction in mech.reactions() {
        let (reactants, products) = reaction.reacting_sides();
        if reactants.len() != 2 || products.len() != 2 {
            continue;
        }
        let hot_in = |side: &[&str]| {
            side.iter()
                .find(|s| hot.iter().any(|h| h.as_str() == **s))
                .map(|s| s.to_string())
        };
        match (hot_in(&reactants), hot_in(&products)) {
            (None, Some(h)) => out.push((reaction.clone(), reaction.clone(), h)),
            (Some(h), None) => out.push((reaction.clone(), reaction.reversed(), h)),
            _ => {}
        }
    }
    out
}

fn explicit_candidates(mech: &Mechanism, pairs: &[(Reaction, String)]) -> Vec<(Reaction, Reaction, String)> {
    let mut out = Vec::new();
    for (reaction, radical) in pairs {
        if !mech.contains(reaction) {
            warn!("PED channel {} is not in the mechanism, skipped", reaction);
            continue;
        }
        let oriented = if reaction.reactants.contains(radical) {
            reaction.reversed()
        } else {
            reaction.clone()
        };
        out.push((reaction.clone(), oriented, radical.clone()));
    }
    out
}

/// Groups PED channels with the decomposition of their hot products.
///
/// `ped_pairs` overrides the automatic choice of PED channels (2->2 reactions producing a
/// hot radical). With `config.dh` set, only channels releasing more than `dh` kcal/mol
/// are kept; channels whose energetics are unknown are skipped.
pub fn group_prompt_chains(
    mech: &Mechanism,
    pes: &PesGrouping,
    hot: &[String],
    config: &PromptConfig,
    energy: &EnergySource,
    ped_pairs: Option<&[(Reaction, String)]>,
) -> Vec<PromptGroup> {
    let candidates = match ped_pairs {
        Some(pairs) => explicit_candidates(mech, pairs),
        None => ped_candidates(mech, hot),
    };

    let mut seeds_by_pes: BTreeMap<usize, Vec<PedSeed>> = BTreeMap::new();
    for (key, oriented, radical) in candidates {
        if let Some(dh) = config.dh {
            match energy.energy_release(&oriented) {
                Some(release) if release > dh => {}
                Some(release) => {
                    debug!("{} releases {:.2} kcal/mol, below {}", oriented.ped_label(), release, dh);
                    continue;
                }
                None => {
                    warn!("missing energies for {}, PED channel skipped", oriented.ped_label());
                    continue;
                }
            }
        }
        let Some(id) = pes.channel_of(&key) else {
            continue;
        };
        seeds_by_pes.entry(id.pes).or_default().push(PedSeed {
            id,
            key,
            oriented,
            radical,
        });
    }

    let mut groups = Vec::new();
    for (_, mut seeds) in seeds_by_pes {
        seeds.sort_by_key(|s| s.id);
        let mut group = PromptGroup::new(groups.len() + 1, &config.model_type);
        for seed in &seeds {
            group.push((seed.id.pes, seed.id.subpes), &seed.key, vec![seed.oriented.ped_label()], vec![]);
        }

        let mut radicals: Vec<&str> = Vec::new();
        for h in hot {
            if seeds.iter().any(|s| &s.radical == h) {
                radicals.push(h.as_str());
            }
        }
        for seed in &seeds {
            if !radicals.contains(&seed.radical.as_str()) {
                radicals.push(seed.radical.as_str());
            }
        }

        let mut downstream: Vec<(ChannelId, &Reaction, &str)> = Vec::new();
        for radical in &radicals {
            let found = dissociations(pes, radical);
            if found.is_empty() {
                debug!("hot radical {} has no dissociation channel", radical);
            }
            downstream.extend(found.into_iter().map(|(id, r)| (id, r, *radical)));
        }
        downstream.sort_by_key(|(id, _, _)| *id);

        let mut included: HashSet<&Reaction> = seeds.iter().map(|s| &s.key).collect();
        let mut queue: VecDeque<&Reaction> = VecDeque::new();
        for (id, r, radical) in downstream {
            if included.insert(r) {
                group.push((id.pes, id.subpes), r, vec![], vec![radical.to_string()]);
                queue.push_back(r);
            }
        }

        if config.look_for_prompt_chains {
            let mut expanded: HashSet<&str> = radicals.iter().copied().collect();
            while let Some(r) = queue.pop_front() {
                let (reactants, products) = r.reacting_sides();
                let fragments = if reactants.len() == 1 { products } else { reactants };
                for fragment in fragments {
                    if !mech.species.is_radical(fragment) || expanded.contains(fragment) {
                        continue;
                    }
                    expanded.insert(fragment);
                    for (id, next) in dissociations(pes, fragment) {
                        if included.insert(next) {
                            debug!("prompt chain continues through {}", fragment);
                            group.push((id.pes, id.subpes), next, vec![], vec![fragment.to_string()]);
                            queue.push_back(next);
                        }
                    }
                }
            }
        }
        groups.push(group);
    }
    info!("{} prompt-dissociation groups", groups.len());
    groups
}
