use crate::core::io::ParseErrorKind;
use std::fmt;
use std::str::FromStr;

/// The closed set of interaction classes a coarse-grained model can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InteractionKind {
    PairNonbonded,
    PairBonded,
    Angular,
    Dihedral,
    Distance13,
    Distance14,
    Distance15,
    Density,
    RadiusOfGyration,
    Helical,
    OneBody,
    ThreeBodyNonbonded,
}

/// How a type tuple is brought to canonical form before hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleSymmetry {
    /// One-body tuples; nothing to reorder.
    Single,
    /// A chain read in either direction is the same interaction.
    Reversal,
    /// Angle-like tuples: the middle (vertex) type is distinguished and the two
    /// end types are interchangeable.
    Vertex,
    /// Order carries meaning ("density at A due to B").
    Ordered,
}

/// The set of names a class's type tokens are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpace {
    CgTypes,
    DensityGroups,
    MoleculeGroups,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionStrategy {
    /// Line `i` describes the defined interaction with index `i`.
    Positional,
    /// Each line names its types; lines may be partial and unordered.
    Keyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeFile {
    Nonbonded,
    Bonded,
    Density,
    RadiusOfGyration,
    Helical,
    OneBody,
    Distance,
}

impl RangeFile {
    pub fn file_name(self) -> &'static str {
        match self {
            RangeFile::Nonbonded => "rmin.in",
            RangeFile::Bonded => "rmin_b.in",
            RangeFile::Density => "rmin_den.in",
            RangeFile::RadiusOfGyration => "rmin_rg.in",
            RangeFile::Helical => "rmin_hel.in",
            RangeFile::OneBody => "rmin_1.in",
            RangeFile::Distance => "rmin_r.in",
        }
    }

    pub fn strategy(self) -> IngestionStrategy {
        match self {
            RangeFile::Bonded | RangeFile::Distance => IngestionStrategy::Positional,
            _ => IngestionStrategy::Keyed,
        }
    }
}

/// Kind-specific trailing parameters of a range line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ExtraParams {
    #[default]
    None,
    Density {
        sigma: f64,
        switch: Option<f64>,
    },
    Helical {
        r0: f64,
        sigma2: f64,
    },
}

/// The tokens of one range line, split into their roles.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFields<'a> {
    pub type_tokens: &'a [&'a str],
    pub lower: f64,
    pub upper: f64,
    pub mode: &'a str,
    pub extra: ExtraParams,
}

impl InteractionKind {
    /// Every kind that is read from a range file, in reading order.
    pub const RANGE_ORDER: [InteractionKind; 11] = [
        InteractionKind::PairNonbonded,
        InteractionKind::PairBonded,
        InteractionKind::Angular,
        InteractionKind::Dihedral,
        InteractionKind::Distance13,
        InteractionKind::Distance14,
        InteractionKind::Distance15,
        InteractionKind::Density,
        InteractionKind::RadiusOfGyration,
        InteractionKind::Helical,
        InteractionKind::OneBody,
    ];

    /// Every kind, in the order classes are laid out in the regression matrix.
    pub const ALL: [InteractionKind; 12] = [
        InteractionKind::PairNonbonded,
        InteractionKind::PairBonded,
        InteractionKind::Angular,
        InteractionKind::Dihedral,
        InteractionKind::Distance13,
        InteractionKind::Distance14,
        InteractionKind::Distance15,
        InteractionKind::Density,
        InteractionKind::RadiusOfGyration,
        InteractionKind::Helical,
        InteractionKind::OneBody,
        InteractionKind::ThreeBodyNonbonded,
    ];

    pub fn n_body(self) -> usize {
        match self {
            InteractionKind::OneBody
            | InteractionKind::RadiusOfGyration
            | InteractionKind::Helical => 1,
            InteractionKind::PairNonbonded
            | InteractionKind::PairBonded
            | InteractionKind::Density => 2,
            InteractionKind::Angular
            | InteractionKind::Distance13
            | InteractionKind::ThreeBodyNonbonded => 3,
            InteractionKind::Dihedral | InteractionKind::Distance14 => 4,
            InteractionKind::Distance15 => 5,
        }
    }

    pub fn symmetry(self) -> TupleSymmetry {
        match self {
            InteractionKind::OneBody
            | InteractionKind::RadiusOfGyration
            | InteractionKind::Helical => TupleSymmetry::Single,
            InteractionKind::Density => TupleSymmetry::Ordered,
            InteractionKind::Angular
            | InteractionKind::Distance13
            | InteractionKind::ThreeBodyNonbonded => TupleSymmetry::Vertex,
            InteractionKind::PairNonbonded
            | InteractionKind::PairBonded
            | InteractionKind::Dihedral
            | InteractionKind::Distance14
            | InteractionKind::Distance15 => TupleSymmetry::Reversal,
        }
    }

    pub fn type_space(self) -> TypeSpace {
        match self {
            InteractionKind::Density => TypeSpace::DensityGroups,
            InteractionKind::RadiusOfGyration | InteractionKind::Helical => {
                TypeSpace::MoleculeGroups
            }
            _ => TypeSpace::CgTypes,
        }
    }

    /// `None` for the three-body class, which is never read from a range file.
    pub fn range_file(self) -> Option<RangeFile> {
        match self {
            InteractionKind::PairNonbonded => Some(RangeFile::Nonbonded),
            InteractionKind::PairBonded | InteractionKind::Angular | InteractionKind::Dihedral => {
                Some(RangeFile::Bonded)
            }
            InteractionKind::Distance13
            | InteractionKind::Distance14
            | InteractionKind::Distance15 => Some(RangeFile::Distance),
            InteractionKind::Density => Some(RangeFile::Density),
            InteractionKind::RadiusOfGyration => Some(RangeFile::RadiusOfGyration),
            InteractionKind::Helical => Some(RangeFile::Helical),
            InteractionKind::OneBody => Some(RangeFile::OneBody),
            InteractionKind::ThreeBodyNonbonded => None,
        }
    }

    /// Optional classes are switched off by a zero subtype.
    pub fn is_optional(self) -> bool {
        !matches!(
            self,
            InteractionKind::PairNonbonded
                | InteractionKind::PairBonded
                | InteractionKind::Angular
                | InteractionKind::Dihedral
        )
    }

    pub fn max_subtype(self) -> i32 {
        match self {
            InteractionKind::ThreeBodyNonbonded => 3,
            _ => 4,
        }
    }

    pub fn allows_negative_lower_cutoff(self) -> bool {
        self == InteractionKind::Dihedral
    }

    pub fn full_name(self) -> &'static str {
        match self {
            InteractionKind::PairNonbonded => "pair nonbonded",
            InteractionKind::PairBonded => "pair bonded",
            InteractionKind::Angular => "angular",
            InteractionKind::Dihedral => "dihedral",
            InteractionKind::Distance13 => "R13 distance",
            InteractionKind::Distance14 => "R14 distance",
            InteractionKind::Distance15 => "R15 distance",
            InteractionKind::Density => "density",
            InteractionKind::RadiusOfGyration => "radius of gyration",
            InteractionKind::Helical => "helical",
            InteractionKind::OneBody => "one body",
            InteractionKind::ThreeBodyNonbonded => "three body nonbonded",
        }
    }

    /// Suffix appended to per-interaction base names; empty for pair nonbonded.
    pub fn short_name(self) -> &'static str {
        match self {
            InteractionKind::PairNonbonded => "",
            InteractionKind::PairBonded => "bon",
            InteractionKind::Angular => "ang",
            InteractionKind::Dihedral => "dih",
            InteractionKind::Distance13 => "r13",
            InteractionKind::Distance14 => "r14",
            InteractionKind::Distance15 => "r15",
            InteractionKind::Density => "den",
            InteractionKind::RadiusOfGyration => "rg",
            InteractionKind::Helical => "hel",
            InteractionKind::OneBody => "1b",
            InteractionKind::ThreeBodyNonbonded => "3b",
        }
    }

    /// Header identifier of this class's section in the table file.
    pub fn table_name(self) -> &'static str {
        match self {
            InteractionKind::PairNonbonded => "nonbonded",
            InteractionKind::PairBonded => "bond",
            InteractionKind::Angular => "angle",
            InteractionKind::Dihedral => "dihedral",
            InteractionKind::Distance13 => "r13",
            InteractionKind::Distance14 => "r14",
            InteractionKind::Distance15 => "r15",
            InteractionKind::Density => "density",
            InteractionKind::RadiusOfGyration => "radius_of_gyration",
            InteractionKind::Helical => "helical",
            InteractionKind::OneBody => "one_body",
            InteractionKind::ThreeBodyNonbonded => "three_body",
        }
    }

    /// Key used for this kind in settings files and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            InteractionKind::PairNonbonded => "pair-nonbonded",
            InteractionKind::PairBonded => "pair-bonded",
            InteractionKind::Angular => "angular",
            InteractionKind::Dihedral => "dihedral",
            InteractionKind::Distance13 => "distance13",
            InteractionKind::Distance14 => "distance14",
            InteractionKind::Distance15 => "distance15",
            InteractionKind::Density => "density",
            InteractionKind::RadiusOfGyration => "radius-of-gyration",
            InteractionKind::Helical => "helical",
            InteractionKind::OneBody => "one-body",
            InteractionKind::ThreeBodyNonbonded => "three-body-nonbonded",
        }
    }

    fn has_range_fields(self) -> bool {
        self != InteractionKind::OneBody
    }

    fn extra_field_count(self, subtype: i32) -> usize {
        match self {
            InteractionKind::Density if subtype == 2 || subtype == 4 => 2,
            InteractionKind::Density => 1,
            InteractionKind::Helical => 2,
            _ => 0,
        }
    }

    /// Smallest number of whitespace-separated tokens a range line must carry.
    pub fn min_range_fields(self, subtype: i32) -> usize {
        let range_and_mode = if self.has_range_fields() { 3 } else { 1 };
        self.n_body() + range_and_mode + self.extra_field_count(subtype)
    }

    /// Splits a tokenized range line into types, range, mode and extras.
    ///
    /// One-body lines carry no range and always span `[0, 1]`.
    pub fn parse_range_fields<'a>(
        self,
        subtype: i32,
        tokens: &'a [&'a str],
    ) -> Result<RangeFields<'a>, ParseErrorKind> {
        let expected = self.min_range_fields(subtype);
        if tokens.len() < expected {
            return Err(ParseErrorKind::TooFewFields {
                class: self.full_name(),
                expected,
                found: tokens.len(),
            });
        }

        let n_body = self.n_body();
        let type_tokens = &tokens[..n_body];
        if !self.has_range_fields() {
            return Ok(RangeFields {
                type_tokens,
                lower: 0.0,
                upper: 1.0,
                mode: tokens[n_body],
                extra: ExtraParams::None,
            });
        }

        let lower = parse_number("lower cutoff", tokens[n_body])?;
        let upper = parse_number("upper cutoff", tokens[n_body + 1])?;
        let mode = tokens[n_body + 2];
        let rest = &tokens[n_body + 3..];

        let extra = match self {
            InteractionKind::Density => ExtraParams::Density {
                sigma: parse_number("density sigma", rest[0])?,
                switch: if subtype == 2 || subtype == 4 {
                    Some(parse_number("density switch", rest[1])?)
                } else {
                    None
                },
            },
            InteractionKind::Helical => ExtraParams::Helical {
                r0: parse_number("helical r0", rest[0])?,
                sigma2: parse_number("helical sigma2", rest[1])?,
            },
            _ => ExtraParams::None,
        };

        Ok(RangeFields {
            type_tokens,
            lower,
            upper,
            mode,
            extra,
        })
    }
}

pub(crate) fn parse_number(field: &'static str, token: &str) -> Result<f64, ParseErrorKind> {
    token.parse().map_err(|_| ParseErrorKind::InvalidNumber {
        field,
        value: token.to_string(),
    })
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InteractionKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| format!("unknown interaction kind '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_range_fields_accounts_for_kind_specific_extras() {
        assert_eq!(InteractionKind::PairNonbonded.min_range_fields(0), 5);
        assert_eq!(InteractionKind::OneBody.min_range_fields(1), 2);
        assert_eq!(InteractionKind::Helical.min_range_fields(1), 6);
        assert_eq!(InteractionKind::Density.min_range_fields(1), 6);
        assert_eq!(InteractionKind::Density.min_range_fields(2), 7);
        assert_eq!(InteractionKind::Dihedral.min_range_fields(0), 7);
    }

    #[test]
    fn parse_range_fields_reads_pair_line() {
        let tokens = ["1", "2", "0.0", "3.0", "fm+tab"];
        let fields = InteractionKind::PairNonbonded
            .parse_range_fields(0, &tokens)
            .unwrap();
        assert_eq!(fields.type_tokens, &["1", "2"]);
        assert_eq!(fields.lower, 0.0);
        assert_eq!(fields.upper, 3.0);
        assert_eq!(fields.mode, "fm+tab");
        assert_eq!(fields.extra, ExtraParams::None);
    }

    #[test]
    fn parse_range_fields_gives_one_body_fixed_unit_range() {
        let tokens = ["A", "fm"];
        let fields = InteractionKind::OneBody.parse_range_fields(1, &tokens).unwrap();
        assert_eq!((fields.lower, fields.upper), (0.0, 1.0));
        assert_eq!(fields.mode, "fm");
    }

    #[test]
    fn parse_range_fields_reads_density_sigma_and_switch() {
        let tokens = ["G1", "G2", "0.0", "8.0", "fm", "1.5", "7.0"];
        let fields = InteractionKind::Density.parse_range_fields(4, &tokens).unwrap();
        assert_eq!(
            fields.extra,
            ExtraParams::Density {
                sigma: 1.5,
                switch: Some(7.0)
            }
        );

        let fields = InteractionKind::Density.parse_range_fields(1, &tokens).unwrap();
        assert_eq!(
            fields.extra,
            ExtraParams::Density {
                sigma: 1.5,
                switch: None
            }
        );
    }

    #[test]
    fn parse_range_fields_reads_helical_parameters() {
        let tokens = ["M1", "0.0", "1.0", "fm", "0.5", "0.04"];
        let fields = InteractionKind::Helical.parse_range_fields(1, &tokens).unwrap();
        assert_eq!(
            fields.extra,
            ExtraParams::Helical {
                r0: 0.5,
                sigma2: 0.04
            }
        );
    }

    #[test]
    fn parse_range_fields_rejects_short_lines() {
        let tokens = ["1", "2", "0.0"];
        let err = InteractionKind::PairNonbonded
            .parse_range_fields(0, &tokens)
            .unwrap_err();
        assert_eq!(
            err,
            ParseErrorKind::TooFewFields {
                class: "pair nonbonded",
                expected: 5,
                found: 3
            }
        );
    }

    #[test]
    fn parse_range_fields_rejects_non_numeric_cutoffs() {
        let tokens = ["1", "2", "zero", "3.0", "fm"];
        let err = InteractionKind::PairNonbonded
            .parse_range_fields(0, &tokens)
            .unwrap_err();
        assert!(matches!(err, ParseErrorKind::InvalidNumber { field: "lower cutoff", .. }));
    }

    #[test]
    fn kind_keys_round_trip_through_from_str() {
        for kind in InteractionKind::RANGE_ORDER {
            assert_eq!(kind.key().parse::<InteractionKind>(), Ok(kind));
        }
        assert_eq!(
            "three-body-nonbonded".parse::<InteractionKind>(),
            Ok(InteractionKind::ThreeBodyNonbonded)
        );
        assert!("quadrupole".parse::<InteractionKind>().is_err());
    }

    #[test]
    fn bonded_and_distance_files_are_positional() {
        assert_eq!(RangeFile::Bonded.strategy(), IngestionStrategy::Positional);
        assert_eq!(RangeFile::Distance.strategy(), IngestionStrategy::Positional);
        assert_eq!(RangeFile::Nonbonded.strategy(), IngestionStrategy::Keyed);
        assert_eq!(InteractionKind::ThreeBodyNonbonded.range_file(), None);
    }
}
