//! # PES grouping
//!
//! Reactions are grouped into potential-energy surfaces by the elemental composition of
//! their reacting reactants: two reactions belong to the same PES when their reactant
//! sides carry the same Hill formula. Inside a PES, channels are joined into sub-PESs
//! when they share a unimolecular well (a side made of one species), so that a chain
//! `R+O2=RO2`, `RO2=QOOH`, `QOOH=products` ends up in one sub-PES while an unrelated
//! bimolecular channel on the same surface stays on its own.
//!
//! Indices are 0-based and follow first appearance in the mechanism.
use crate::Mechanism::mech_store::Mechanism;
use crate::Mechanism::reaction::Reaction;
use crate::Mechanism::species::SpeciesTable;
use crate::Utils::config::ChannelNumbering;
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};

/// Position of a reaction in the PES hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId {
    pub pes: usize,
    pub subpes: usize,
    pub chnl: usize,
}

/// Key of the PES dictionary; ordered by PES index, then sub-PES index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PesKey {
    pub pes_idx: usize,
    pub subpes_idx: usize,
    pub formula: String,
}

/// `(channel index, (reactants, products))` per sub-PES.
pub type PesDct = BTreeMap<PesKey, Vec<(usize, (Vec<String>, Vec<String>))>>;

#[derive(Debug, Clone)]
pub struct PesGroup {
    pub formula: String,
    /// reactions of every sub-PES, in mechanism order
    pub subpes: Vec<Vec<Reaction>>,
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }
    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }
    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // the older member stays root so component order follows first appearance
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

/// Canonical identities of the single-species sides of a reaction, spectators removed.
pub fn unimolecular_wells<'a>(reaction: &'a Reaction, species: &'a SpeciesTable) -> Vec<&'a str> {
    let (reactants, products) = reaction.reacting_sides();
    let mut wells = Vec::new();
    for side in [reactants, products] {
        if let [single] = side.as_slice() {
            let id = species.canonical(single);
            if !wells.contains(&id) {
                wells.push(id);
            }
        }
    }
    wells
}

#[derive(Debug, Clone, Default)]
pub struct PesGrouping {
    groups: Vec<PesGroup>,
    channels: HashMap<Reaction, ChannelId>,
}

impl PesGrouping {
    /// Groups every reaction of `mech`. With `split_subpes == false` each PES is a single sub-PES.
    pub fn build(mech: &Mechanism, split_subpes: bool, numbering: ChannelNumbering) -> Self {
        let mut pes_index: HashMap<String, usize> = HashMap::new();
        let mut members: Vec<(String, Vec<&Reaction>)> = Vec::new();
        for reaction in mech.reactions() {
            let formula = mech.formula_signature(reaction);
            let idx = *pes_index.entry(formula.clone()).or_insert_with(|| {
                members.push((formula, Vec::new()));
                members.len() - 1
            });
            members[idx].1.push(reaction);
        }

        let mut grouping = PesGrouping::default();
        for (pes, (formula, reactions)) in members.into_iter().enumerate() {
            let components = if split_subpes {
                connected_channels(&reactions, &mech.species)
            } else {
                vec![(0..reactions.len()).collect()]
            };
            let mut subpes_of = vec![0; reactions.len()];
            for (sub, component) in components.iter().enumerate() {
                for &i in component {
                    subpes_of[i] = sub;
                }
            }
            let mut per_subpes_count = vec![0; components.len()];
            for (i, reaction) in reactions.iter().enumerate() {
                let subpes = subpes_of[i];
                let chnl = match numbering {
                    ChannelNumbering::PerPes => i,
                    ChannelNumbering::PerSubPes => per_subpes_count[subpes],
                };
                per_subpes_count[subpes] += 1;
                grouping
                    .channels
                    .insert((*reaction).clone(), ChannelId { pes, subpes, chnl });
            }
            debug!("PES {} ({}): {} sub-PES", pes, formula, components.len());
            grouping.groups.push(PesGroup {
                formula,
                subpes: components
                    .iter()
                    .map(|c| c.iter().map(|&i| (*reactions[i]).clone()).collect())
                    .collect(),
            });
        }
        info!(
            "{} reactions grouped into {} PES",
            grouping.channels.len(),
            grouping.groups.len()
        );
        grouping
    }

    pub fn channel_of(&self, reaction: &Reaction) -> Option<ChannelId> {
        self.channels.get(reaction).copied()
    }

    pub fn groups(&self) -> &[PesGroup] {
        &self.groups
    }

    pub fn subpes_members(&self, pes: usize, subpes: usize) -> &[Reaction] {
        self.groups
            .get(pes)
            .and_then(|g| g.subpes.get(subpes))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `(pes, subpes, members)` for every sub-PES in index order.
    pub fn iter_subpes(&self) -> impl Iterator<Item = (usize, usize, &[Reaction])> {
        self.groups.iter().enumerate().flat_map(|(pes, group)| {
            group
                .subpes
                .iter()
                .enumerate()
                .map(move |(sub, members)| (pes, sub, members.as_slice()))
        })
    }

    pub fn pes_dct(&self) -> PesDct {
        let mut dct = PesDct::new();
        for (pes_idx, group) in self.groups.iter().enumerate() {
            for (subpes_idx, members) in group.subpes.iter().enumerate() {
                let mut channels: Vec<(usize, (Vec<String>, Vec<String>))> = members
                    .iter()
                    .filter_map(|r| {
                        self.channel_of(r)
                            .map(|id| (id.chnl, (r.reactants.clone(), r.products.clone())))
                    })
                    .collect();
                channels.sort_by_key(|(chnl, _)| *chnl);
                dct.insert(
                    PesKey {
                        pes_idx,
                        subpes_idx,
                        formula: group.formula.clone(),
                    },
                    channels,
                );
            }
        }
        dct
    }
}

/// Components of channels linked through shared wells, each listed in input order,
/// components ordered by their first member.
fn connected_channels(reactions: &[&Reaction], species: &SpeciesTable) -> Vec<Vec<usize>> {
    let mut uf = UnionFind::new(reactions.len());
    let mut first_with_well: HashMap<&str, usize> = HashMap::new();
    for (i, reaction) in reactions.iter().enumerate() {
        for well in unimolecular_wells(reaction, species) {
            match first_with_well.get(well) {
                Some(&j) => uf.union(j, i),
                None => {
                    first_with_well.insert(well, i);
                }
            }
        }
    }
    let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..reactions.len() {
        let root = uf.find(i);
        by_root.entry(root).or_default().push(i);
    }
    by_root.into_values().collect()
}
