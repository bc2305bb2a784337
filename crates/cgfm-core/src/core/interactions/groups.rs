use super::class::InteractionClass;
use std::collections::BTreeSet;

/// Which density-group interactions connect two CG site types.
///
/// Entry `(t1, t2)` lists the defined density interactions `(dg1, dg2)` that
/// are active (matched or tabulated) with `t1` in `dg1` and `t2` in `dg2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DensityAdjacency {
    n_cg_types: usize,
    pairs: Vec<BTreeSet<usize>>,
}

impl DensityAdjacency {
    /// `members[dg]` holds the 0-based CG types belonging to density group `dg`.
    pub fn build(class: &InteractionClass, members: &[BTreeSet<usize>], n_cg_types: usize) -> Self {
        let mut pairs = vec![BTreeSet::new(); n_cg_types * n_cg_types];
        if class.n_defined() == 0 {
            return Self { n_cg_types, pairs };
        }

        for (dg1, types1) in members.iter().enumerate() {
            for (dg2, types2) in members.iter().enumerate() {
                let Some(index) = class.index_of_tuple(&[dg1 as i32 + 1, dg2 as i32 + 1]) else {
                    continue;
                };
                let interaction = &class.interactions()[index];
                if !(interaction.is_matched() || interaction.is_tabulated()) {
                    continue;
                }
                for &t1 in types1.iter().filter(|&&t| t < n_cg_types) {
                    for &t2 in types2.iter().filter(|&&t| t < n_cg_types) {
                        pairs[t1 * n_cg_types + t2].insert(index);
                    }
                }
            }
        }
        Self { n_cg_types, pairs }
    }

    /// Whether sites of types `t1` and `t2` (0-based) interact through some density-group pair.
    pub fn interacts(&self, t1: usize, t2: usize) -> bool {
        self.interactions(t1, t2).next().is_some()
    }

    /// Defined density interactions linking types `t1` and `t2`, ascending.
    pub fn interactions(&self, t1: usize, t2: usize) -> impl Iterator<Item = usize> + '_ {
        let slot = if t1 < self.n_cg_types && t2 < self.n_cg_types {
            self.pairs.get(t1 * self.n_cg_types + t2)
        } else {
            None
        };
        slot.into_iter().flat_map(|set| set.iter().copied())
    }
}

/// Per molecule, the `(site, partner)` pairs that carry a helical interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelicalList {
    pairs: Vec<Vec<(usize, usize)>>,
}

impl HelicalList {
    /// Pairs each site with the far ends of its dihedrals that lie earlier in the
    /// same molecule.
    ///
    /// `dihedral_partners[site]` lists the other three sites of each dihedral the
    /// site starts; the last of them is the candidate partner.
    pub fn build(
        molecule_sites: &[Vec<usize>],
        dihedral_partners: &[Vec<[usize; 3]>],
        molecule_ids: &[usize],
    ) -> Self {
        let pairs = molecule_sites
            .iter()
            .enumerate()
            .map(|(molecule, sites)| {
                sites
                    .iter()
                    .flat_map(|&site| {
                        dihedral_partners
                            .get(site)
                            .into_iter()
                            .flatten()
                            .map(move |partners| (site, partners[2]))
                    })
                    .filter(|&(site, partner)| {
                        partner < site && molecule_ids.get(partner) == Some(&molecule)
                    })
                    .collect()
            })
            .collect();
        Self { pairs }
    }

    pub fn n_molecules(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self, molecule: usize) -> &[(usize, usize)] {
        self.pairs.get(molecule).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interactions::hash::{DefinedSet, TupleHasher};
    use crate::core::interactions::kind::{ExtraParams, InteractionKind};
    use crate::core::interactions::mode::resolve_mode;
    use crate::core::interactions::settings::ClassSettings;

    fn density_class(modes: &[&str]) -> InteractionClass {
        let kind = InteractionKind::Density;
        let params = ClassSettings {
            subtype: Some(1),
            basis: Some(crate::core::interactions::settings::BasisType::Delta),
            ..Default::default()
        }
        .resolve(kind, 10.0)
        .unwrap();
        let names = vec!["G1".to_string(), "G2".to_string()];
        let hasher = TupleHasher::new(kind.symmetry(), kind.n_body(), 2);
        let mut class = InteractionClass::new(kind, params, names, DefinedSet::complete(&hasher));
        for (index, mode) in modes.iter().enumerate() {
            class.record_range(index, 0.0, 5.0, ExtraParams::None);
            class.assign_roles(index, resolve_mode(mode).unwrap());
        }
        class
    }

    #[test]
    fn density_adjacency_is_directional() {
        // Defined order: (G1,G1), (G1,G2), (G2,G1), (G2,G2).
        let class = density_class(&["none", "fm", "none", "tab"]);
        let members = vec![BTreeSet::from([0]), BTreeSet::from([1, 2])];
        let adjacency = DensityAdjacency::build(&class, &members, 3);

        assert!(adjacency.interacts(0, 1));
        assert!(adjacency.interacts(0, 2));
        assert!(!adjacency.interacts(1, 0));
        assert!(!adjacency.interacts(0, 0));
        assert_eq!(adjacency.interactions(2, 1).collect::<Vec<_>>(), vec![3]);
        assert!(!adjacency.interacts(5, 0));
    }

    #[test]
    fn helical_list_pairs_earlier_partners_in_same_molecule() {
        let molecule_sites = vec![vec![0, 1, 2, 3, 4], vec![5, 6, 7, 8]];
        let mut dihedral_partners = vec![Vec::new(); 9];
        dihedral_partners[3] = vec![[2, 1, 0]];
        dihedral_partners[4] = vec![[3, 2, 1], [3, 2, 5]];
        dihedral_partners[0] = vec![[1, 2, 3]];
        dihedral_partners[8] = vec![[7, 6, 5]];
        let molecule_ids = vec![0, 0, 0, 0, 0, 1, 1, 1, 1];

        let list = HelicalList::build(&molecule_sites, &dihedral_partners, &molecule_ids);
        assert_eq!(list.n_molecules(), 2);
        assert_eq!(list.pairs(0), &[(3, 0), (4, 1)]);
        assert_eq!(list.pairs(1), &[(8, 5)]);
        assert!(list.pairs(7).is_empty());
    }
}
