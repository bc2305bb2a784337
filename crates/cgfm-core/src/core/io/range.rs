use super::error::{InputError, ParseErrorKind};
use super::reader::LineReader;
use crate::core::interactions::class::InteractionClass;
use crate::core::interactions::hash::{TypeIndex, UNKNOWN_TYPE, match_type};
use crate::core::interactions::kind::{ExtraParams, IngestionStrategy, InteractionKind};
use crate::core::interactions::mode::{ModeRoles, resolve_mode};
use std::collections::BTreeMap;
use std::io::BufRead;
use tracing::{debug, info, warn};

/// A range line after tokenizing, type resolution and mode resolution.
struct RangeEntry {
    line: usize,
    lower: f64,
    upper: f64,
    roles: ModeRoles,
    extra: ExtraParams,
}

/// Reads one class's ranges with the strategy its range file uses.
pub fn read_class_ranges<R: BufRead>(
    class: &mut InteractionClass,
    reader: &mut LineReader<R>,
    strict: bool,
) -> Result<(), InputError> {
    let Some(file) = class.kind().range_file() else {
        return Ok(());
    };
    match file.strategy() {
        IngestionStrategy::Keyed => read_keyed(class, reader, strict)?,
        IngestionStrategy::Positional => read_positional(class, reader, strict)?,
    }
    class.log_role_summary();
    Ok(())
}

/// Resolves type tokens in the class's type space.
///
/// Unknown tokens become [`UNKNOWN_TYPE`], or an error when `strict` is set.
pub(crate) fn resolve_types<R: BufRead>(
    class: &InteractionClass,
    tokens: &[&str],
    reader: &LineReader<R>,
    strict: bool,
) -> Result<Vec<TypeIndex>, InputError> {
    tokens
        .iter()
        .map(|token| {
            let index = match_type(token, class.type_names());
            if index == UNKNOWN_TYPE && strict {
                Err(reader.error(ParseErrorKind::UnknownType {
                    token: token.to_string(),
                }))
            } else {
                Ok(index)
            }
        })
        .collect()
}

/// Index among defined of a named tuple; naming an undefined tuple is an error.
pub(crate) fn lookup_tuple<R: BufRead>(
    class: &InteractionClass,
    tokens: &[&str],
    reader: &LineReader<R>,
    strict: bool,
) -> Result<usize, InputError> {
    let types = resolve_types(class, tokens, reader, strict)?;
    class.index_of_tuple(&types).ok_or_else(|| {
        reader.error(ParseErrorKind::UndefinedInteraction {
            class: class.kind().full_name(),
            types: tokens.join(" "),
        })
    })
}

fn parse_entry<R: BufRead>(
    kind: InteractionKind,
    subtype: i32,
    tokens: &[&str],
    reader: &LineReader<R>,
) -> Result<RangeEntry, InputError> {
    let fields = kind
        .parse_range_fields(subtype, tokens)
        .map_err(|e| reader.error(e))?;
    let roles = resolve_mode(fields.mode).map_err(|e| reader.error(e))?;
    Ok(RangeEntry {
        line: reader.line_number(),
        lower: fields.lower,
        upper: fields.upper,
        roles,
        extra: fields.extra,
    })
}

fn apply_entry(class: &mut InteractionClass, index: usize, entry: RangeEntry) {
    debug!(
        interaction = %class.describe(index),
        line = entry.line,
        lower = entry.lower,
        upper = entry.upper,
        "Read interaction range"
    );
    class.record_range(index, entry.lower, entry.upper, entry.extra);
    class.assign_roles(index, entry.roles);
}

/// Reads lines that name their tuple explicitly.
///
/// Reading stops at end of input or at the first line too short to be a range
/// line; a short first line is an error. Roles are assigned afterwards in
/// ascending index order, so the file may list tuples in any order.
pub fn read_keyed<R: BufRead>(
    class: &mut InteractionClass,
    reader: &mut LineReader<R>,
    strict: bool,
) -> Result<(), InputError> {
    let kind = class.kind();
    let subtype = class.params().subtype;
    let n_body = kind.n_body();
    let min_fields = kind.min_range_fields(subtype);
    let mut entries: BTreeMap<usize, RangeEntry> = BTreeMap::new();
    let mut n_lines = 0usize;

    while let Some(line) = reader.next_line()? {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < min_fields {
            if n_lines == 0 {
                return Err(reader.error(ParseErrorKind::TooFewFields {
                    class: kind.full_name(),
                    expected: min_fields,
                    found: tokens.len(),
                }));
            }
            break;
        }

        let index = lookup_tuple(class, &tokens[..n_body], reader, strict)?;
        let entry = parse_entry(kind, subtype, &tokens, reader)?;
        if let Some(previous) = entries.insert(index, entry) {
            warn!(
                interaction = %class.describe(index),
                first_line = previous.line,
                line = reader.line_number(),
                "Interaction listed more than once; keeping the last line"
            );
        }
        n_lines += 1;
    }

    if n_lines == 0 {
        info!(class = kind.full_name(), path = reader.path(), "No range lines found");
    }
    for (index, entry) in entries {
        apply_entry(class, index, entry);
    }
    Ok(())
}

/// Reads exactly one line per defined interaction, in index order.
///
/// Type tokens are not needed to place a line; a line whose tokens name a
/// different defined tuple is reported.
pub fn read_positional<R: BufRead>(
    class: &mut InteractionClass,
    reader: &mut LineReader<R>,
    strict: bool,
) -> Result<(), InputError> {
    let kind = class.kind();
    let subtype = class.params().subtype;
    let n_body = kind.n_body();

    for index in 0..class.n_defined() {
        let expected = format!("a range line for {}", class.describe(index));
        let line = reader.require_line(&expected)?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let entry = parse_entry(kind, subtype, &tokens, reader)?;

        let types = resolve_types(class, &tokens[..n_body], reader, strict)?;
        if !types.contains(&UNKNOWN_TYPE) && class.index_of_tuple(&types) != Some(index) {
            warn!(
                interaction = %class.describe(index),
                line = reader.line_number(),
                types = %tokens[..n_body].join(" "),
                "Range line names a different interaction than its position"
            );
        }
        apply_entry(class, index, entry);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interactions::class::InteractionClass;
    use crate::core::interactions::hash::{DefinedSet, TupleHasher};
    use crate::core::interactions::settings::{BasisType, ClassSettings};
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn class_for(kind: InteractionKind, settings: ClassSettings, names: &[&str]) -> InteractionClass {
        let params = settings.resolve(kind, 10.0).unwrap();
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        let hasher = TupleHasher::new(kind.symmetry(), kind.n_body(), names.len());
        InteractionClass::new(kind, params, names, DefinedSet::complete(&hasher))
    }

    fn reader(content: &str) -> LineReader<Cursor<String>> {
        LineReader::new(Cursor::new(content.to_string()), "rmin.in")
    }

    fn pair_class() -> InteractionClass {
        class_for(InteractionKind::PairNonbonded, ClassSettings::default(), &["A", "B", "C"])
    }

    #[test]
    fn keyed_pair_ranges_assign_roles_per_mode() {
        let mut class = pair_class();
        let mut input = reader("1 1 0.0 2.5 fm\n1 2 0.0 3.0 fm+tab\n2 2 0.0 2.0 none\n");
        read_class_ranges(&mut class, &mut input, false).unwrap();

        let counts = class.counts();
        assert_eq!(counts.n_to_force_match, 2);
        assert_eq!(counts.n_tabulated, 1);

        let aa = &class.interactions()[class.index_of_tuple(&[1, 1]).unwrap()];
        let ab = &class.interactions()[class.index_of_tuple(&[1, 2]).unwrap()];
        let bb = &class.interactions()[class.index_of_tuple(&[2, 2]).unwrap()];
        assert_eq!(aa.matched_index, 1);
        assert_eq!(ab.matched_index, 2);
        assert_eq!(ab.tabulated_index, 1);
        assert_eq!(
            (bb.matched_index, bb.tabulated_index, bb.symmetric_index, bb.symtab_index),
            (0, 0, 0, 0)
        );
    }

    #[test]
    fn keyed_lines_may_come_in_any_order() {
        let mut class = pair_class();
        let mut input = reader("C C 0.0 2.0 fm\nB A 0.0 3.0 fm\nA A 0.0 2.5 fm\n");
        read_keyed(&mut class, &mut input, false).unwrap();

        let matched: Vec<usize> = [[1, 1], [1, 2], [3, 3]]
            .iter()
            .map(|tuple| class.interactions()[class.index_of_tuple(tuple).unwrap()].matched_index)
            .collect();
        assert_eq!(matched, vec![1, 2, 3]);
    }

    #[test]
    fn keyed_reading_stops_at_short_line() {
        let mut class = pair_class();
        let mut input = reader("A A 0.0 2.5 fm\n\nB B 0.0 2.5 fm\n");
        read_keyed(&mut class, &mut input, false).unwrap();
        assert_eq!(class.counts().n_to_force_match, 1);
    }

    #[test]
    fn keyed_short_first_line_is_fatal() {
        let mut class = pair_class();
        let mut input = reader("A A 0.0\n");
        let err = read_keyed(&mut class, &mut input, false).unwrap_err();
        assert_eq!(
            err.parse_kind(),
            Some(&ParseErrorKind::TooFewFields {
                class: "pair nonbonded",
                expected: 5,
                found: 3
            })
        );
    }

    #[test]
    fn keyed_empty_input_defines_nothing() {
        let mut class = pair_class();
        let mut input = reader("");
        read_keyed(&mut class, &mut input, false).unwrap();
        assert_eq!(class.counts().n_to_force_match, 0);
    }

    #[test]
    fn unrecognized_mode_reports_line_number() {
        let mut class = pair_class();
        let mut input = reader("A A 0.0 2.5 fm\nA B 0.0 2.5 fit\n");
        let err = read_keyed(&mut class, &mut input, false).unwrap_err();
        assert!(matches!(
            err,
            InputError::Parse {
                line: 2,
                kind: ParseErrorKind::UnrecognizedMode { .. },
                ..
            }
        ));
    }

    #[test]
    fn unknown_type_is_undefined_by_default_and_unknown_when_strict() {
        let mut class = pair_class();
        let mut input = reader("A Z 0.0 2.5 fm\n");
        let err = read_keyed(&mut class, &mut input, false).unwrap_err();
        assert!(matches!(
            err.parse_kind(),
            Some(ParseErrorKind::UndefinedInteraction { .. })
        ));

        let mut class = pair_class();
        let mut input = reader("A Z 0.0 2.5 fm\n");
        let err = read_keyed(&mut class, &mut input, true).unwrap_err();
        assert_eq!(
            err.parse_kind(),
            Some(&ParseErrorKind::UnknownType {
                token: "Z".to_string()
            })
        );
    }

    #[test]
    fn duplicate_keyed_line_keeps_the_last_one() {
        let mut class = pair_class();
        let mut input = reader("A A 0.0 2.5 fm\nA A 0.0 3.0 tab\n");
        read_keyed(&mut class, &mut input, false).unwrap();
        let aa = &class.interactions()[0];
        assert_eq!(aa.matched_index, 0);
        assert_eq!(aa.tabulated_index, 1);
        assert_eq!(aa.upper_cutoff, 3.0);
    }

    #[test]
    fn symtab_mode_is_accepted_but_assigns_no_role() {
        let mut class = pair_class();
        let mut input = reader("A A 0.0 2.5 symtab\n");
        read_keyed(&mut class, &mut input, false).unwrap();
        assert_eq!(class.counts(), Default::default());
    }

    #[test]
    fn keyed_density_lines_carry_sigma_and_switch() {
        let settings = ClassSettings {
            subtype: Some(2),
            basis: Some(BasisType::Delta),
            ..Default::default()
        };
        let mut class = class_for(InteractionKind::Density, settings, &["G1", "G2"]);
        let mut input = reader("G2 G1 0.0 5.0 fm 0.7 4.5\n");
        read_keyed(&mut class, &mut input, false).unwrap();
        let index = class.index_of_tuple(&[2, 1]).unwrap();
        assert_eq!(
            class.interactions()[index].extra,
            ExtraParams::Density {
                sigma: 0.7,
                switch: Some(4.5)
            }
        );
        assert_eq!(class.interactions()[class.index_of_tuple(&[1, 2]).unwrap()].matched_index, 0);
    }

    #[test]
    fn keyed_one_body_lines_use_unit_range() {
        let settings = ClassSettings {
            subtype: Some(1),
            ..Default::default()
        };
        let mut class = class_for(InteractionKind::OneBody, settings, &["A", "B"]);
        let mut input = reader("B fm\n");
        read_keyed(&mut class, &mut input, false).unwrap();
        let b = &class.interactions()[1];
        assert_eq!((b.lower_cutoff, b.upper_cutoff, b.matched_index), (0.0, 1.0, 1));
    }

    #[test]
    fn positional_lines_follow_defined_order() {
        let mut class = class_for(InteractionKind::PairBonded, ClassSettings::default(), &["A", "B"]);
        let mut input = reader("A A 1.0 2.0 fm\nA B 1.0 2.0 none\nB B 1.0 2.0 sym\n");
        read_positional(&mut class, &mut input, false).unwrap();
        let matched: Vec<usize> = class.interactions().iter().map(|i| i.matched_index).collect();
        assert_eq!(matched, vec![1, 0, 2]);
        assert_eq!(class.interactions()[2].symmetric_index, 1);
        assert_eq!(class.counts().n_force(), 1);
    }

    #[test]
    fn positional_reading_fails_when_lines_run_out() {
        let mut class = class_for(InteractionKind::PairBonded, ClassSettings::default(), &["A", "B"]);
        let mut input = reader("A A 1.0 2.0 fm\n");
        let result = read_positional(&mut class, &mut input, false);
        assert!(matches!(result, Err(InputError::UnexpectedEof { .. })));
    }

    #[test]
    fn positional_classes_share_one_file_in_sequence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rmin_b.in");
        fs::write(&path, "A A 1.0 2.0 fm\nA A A 0.0 180.0 fm\n").unwrap();

        let mut bonds = class_for(InteractionKind::PairBonded, ClassSettings::default(), &["A"]);
        let mut angles = class_for(InteractionKind::Angular, ClassSettings::default(), &["A"]);
        let mut input = LineReader::open(&path).unwrap();
        read_class_ranges(&mut bonds, &mut input, false).unwrap();
        read_class_ranges(&mut angles, &mut input, false).unwrap();

        assert_eq!(bonds.counts().n_to_force_match, 1);
        assert_eq!(angles.interactions()[0].upper_cutoff, 180.0);
        assert_eq!(input.line_number(), 2);
    }

    #[test]
    fn three_body_class_reads_no_range_lines() {
        let settings = ClassSettings {
            subtype: Some(1),
            ..Default::default()
        };
        let mut class = class_for(InteractionKind::ThreeBodyNonbonded, settings, &["A"]);
        let mut input = reader("not a range line\n");
        read_class_ranges(&mut class, &mut input, false).unwrap();
        assert_eq!(input.line_number(), 0);
    }
}
