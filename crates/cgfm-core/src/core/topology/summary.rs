use crate::core::interactions::hash::{TypeIndex, UNKNOWN_TYPE, match_type};
use crate::core::interactions::kind::{InteractionKind, TypeSpace};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DensityGroup {
    pub name: String,
    /// CG type names (or 1-based ids) belonging to the group.
    pub members: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MoleculeGroup {
    pub name: String,
    /// 0-based molecule indices belonging to the group.
    pub molecules: Vec<usize>,
}

/// One molecule's sites and dihedrals, as global 0-based site indices.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Molecule {
    pub sites: Vec<usize>,
    #[serde(default)]
    pub dihedrals: Vec<[usize; 4]>,
}

/// Type tuples present in the topology, per bonded kind.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BondedTuples {
    pub pair_bonded: Option<Vec<Vec<String>>>,
    pub angular: Option<Vec<Vec<String>>>,
    pub dihedral: Option<Vec<Vec<String>>>,
    pub distance13: Option<Vec<Vec<String>>>,
    pub distance14: Option<Vec<Vec<String>>>,
    pub distance15: Option<Vec<Vec<String>>>,
}

impl BondedTuples {
    fn for_kind(&self, kind: InteractionKind) -> Option<&Vec<Vec<String>>> {
        match kind {
            InteractionKind::PairBonded => self.pair_bonded.as_ref(),
            InteractionKind::Angular => self.angular.as_ref(),
            InteractionKind::Dihedral => self.dihedral.as_ref(),
            InteractionKind::Distance13 => self.distance13.as_ref(),
            InteractionKind::Distance14 => self.distance14.as_ref(),
            InteractionKind::Distance15 => self.distance15.as_ref(),
            _ => None,
        }
    }
}

/// Site, type and group information the setup sequence needs from the topology.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TopologySummary {
    pub cg_types: Vec<String>,
    #[serde(default)]
    pub density_groups: Vec<DensityGroup>,
    #[serde(default)]
    pub molecule_groups: Vec<MoleculeGroup>,
    #[serde(default)]
    pub molecules: Vec<Molecule>,
    #[serde(default)]
    pub bonded: BondedTuples,
}

/// Per-molecule sites, per-site dihedral partners and per-site molecule ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelicalInputs {
    pub molecule_sites: Vec<Vec<usize>>,
    pub dihedral_partners: Vec<Vec<[usize; 3]>>,
    pub molecule_ids: Vec<usize>,
}

impl TopologySummary {
    pub fn load(path: &Path) -> Result<Self, TopologyLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| TopologyLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let summary: TopologySummary =
            toml::from_str(&content).map_err(|e| TopologyLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        summary.validate()?;
        Ok(summary)
    }

    fn validate(&self) -> Result<(), TopologyLoadError> {
        self.density_members()?;
        for kind in InteractionKind::RANGE_ORDER {
            self.bonded_tuples(kind)?;
        }
        let n_sites = self.n_sites();
        for molecule in &self.molecules {
            if let Some(&site) = molecule.dihedrals.iter().flatten().find(|&&s| s >= n_sites) {
                return Err(TopologyLoadError::SiteOutOfRange { site, n_sites });
            }
        }
        Ok(())
    }

    pub fn n_cg_types(&self) -> usize {
        self.cg_types.len()
    }

    /// Total number of sites over all molecules.
    pub fn n_sites(&self) -> usize {
        self.molecules
            .iter()
            .flat_map(|m| m.sites.iter())
            .map(|&s| s + 1)
            .max()
            .unwrap_or(0)
    }

    /// Names of the type space a kind's tuples are drawn from.
    pub fn type_names(&self, space: TypeSpace) -> Vec<String> {
        match space {
            TypeSpace::CgTypes => self.cg_types.clone(),
            TypeSpace::DensityGroups => self.density_groups.iter().map(|g| g.name.clone()).collect(),
            TypeSpace::MoleculeGroups => {
                self.molecule_groups.iter().map(|g| g.name.clone()).collect()
            }
        }
    }

    /// 0-based CG types of each density group.
    pub fn density_members(&self) -> Result<Vec<BTreeSet<usize>>, TopologyLoadError> {
        self.density_groups
            .iter()
            .map(|group| {
                group
                    .members
                    .iter()
                    .map(|member| self.resolve_cg_type(member).map(|t| t as usize - 1))
                    .collect()
            })
            .collect()
    }

    /// Natural-order tuples listed for a bonded kind; `None` means every tuple is defined.
    pub fn bonded_tuples(
        &self,
        kind: InteractionKind,
    ) -> Result<Option<Vec<Vec<TypeIndex>>>, TopologyLoadError> {
        let Some(tuples) = self.bonded.for_kind(kind) else {
            return Ok(None);
        };
        tuples
            .iter()
            .map(|tuple| {
                if tuple.len() != kind.n_body() {
                    return Err(TopologyLoadError::TupleLength {
                        kind: kind.full_name(),
                        expected: kind.n_body(),
                        found: tuple.len(),
                    });
                }
                tuple.iter().map(|name| self.resolve_cg_type(name)).collect()
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    pub fn helical_inputs(&self) -> HelicalInputs {
        let n_sites = self.n_sites();
        let mut dihedral_partners = vec![Vec::new(); n_sites];
        let mut molecule_ids = vec![0; n_sites];
        for (id, molecule) in self.molecules.iter().enumerate() {
            for &site in &molecule.sites {
                molecule_ids[site] = id;
            }
            for &[a, b, c, d] in &molecule.dihedrals {
                dihedral_partners[a].push([b, c, d]);
                dihedral_partners[d].push([c, b, a]);
            }
        }
        HelicalInputs {
            molecule_sites: self.molecules.iter().map(|m| m.sites.clone()).collect(),
            dihedral_partners,
            molecule_ids,
        }
    }

    fn resolve_cg_type(&self, token: &str) -> Result<TypeIndex, TopologyLoadError> {
        match match_type(token, &self.cg_types) {
            UNKNOWN_TYPE => Err(TopologyLoadError::UnknownType {
                token: token.to_string(),
            }),
            index => Ok(index),
        }
    }
}

#[derive(Debug, Error)]
pub enum TopologyLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Unknown CG type '{token}' in topology summary")]
    UnknownType { token: String },
    #[error("A {kind} tuple needs {expected} types but lists {found}")]
    TupleLength {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Dihedral site {site} is outside the {n_sites} listed sites")]
    SiteOutOfRange { site: usize, n_sites: usize },
}
