use super::error::{InputError, ParseErrorKind};
use super::range::lookup_tuple;
use super::reader::LineReader;
use crate::core::basis::table::ExternalSplineTable;
use crate::core::interactions::class::InteractionClass;
use crate::core::interactions::kind::parse_number;
use std::io::BufRead;
use tracing::{debug, info};

const TYPES_MARKER: &str = "types";

/// Reads one class's section of a tabulated-spline file.
///
/// The section starts with a `<name> <count> <binwidth>` header. Each entry is
/// either a bare tuple line or a run of `types ...` lines, followed by one
/// `<lower> <upper>` line and its control points. A block read for a run of
/// `types` lines is copied to every tuple in the run. Every tabulated
/// interaction must receive exactly one table.
pub fn read_class_table<R: BufRead>(
    class: &mut InteractionClass,
    reader: &mut LineReader<R>,
    strict: bool,
) -> Result<(), InputError> {
    let kind = class.kind();
    let header = reader.require_line(&format!("the {} table header", kind.table_name()))?;
    let tokens: Vec<&str> = header.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(reader.error(ParseErrorKind::TooFewFields {
            class: kind.full_name(),
            expected: 3,
            found: tokens.len(),
        }));
    }
    if tokens[0] != kind.table_name() {
        return Err(reader.error(ParseErrorKind::TableNameMismatch {
            expected: kind.table_name(),
            found: tokens[0].to_string(),
        }));
    }
    let count: usize = tokens[1].parse().map_err(|_| {
        reader.error(ParseErrorKind::InvalidNumber {
            field: "table count",
            value: tokens[1].to_string(),
        })
    })?;
    let expected = class.counts().n_tabulated;
    if count != expected {
        return Err(reader.error(ParseErrorKind::TableCountMismatch {
            class: kind.full_name(),
            expected,
            found: count,
        }));
    }
    let binwidth = parse_number("table binwidth", tokens[2]).map_err(|e| reader.error(e))?;
    if count > 0 && binwidth <= 0.0 {
        return Err(reader.error(ParseErrorKind::InvalidNumber {
            field: "table binwidth",
            value: tokens[2].to_string(),
        }));
    }

    class.prepare_tables(binwidth);
    let mut filled = 0;
    while filled < count {
        let group = read_tuple_group(class, reader, strict)?;
        let table = read_block(reader, binwidth)?;
        for index in group {
            debug!(
                interaction = %class.describe(index),
                lower = table.lower,
                upper = table.upper,
                points = table.coefficients.len(),
                "Loaded tabulated interaction"
            );
            class.install_table(index, table.clone());
            filled += 1;
        }
    }

    let missing = class
        .tabulated_indices()
        .into_iter()
        .filter(|&index| class.table(index).is_none())
        .count();
    if missing > 0 {
        return Err(reader.error(ParseErrorKind::MissingTables {
            class: kind.full_name(),
            missing,
        }));
    }
    info!(class = kind.full_name(), tables = count, binwidth, "Read tabulated interactions");
    Ok(())
}

fn starts_with_marker(line: &str) -> bool {
    line.split_whitespace().next() == Some(TYPES_MARKER)
}

/// Reads the tuple line(s) of one entry and resolves them to tabulated indices.
fn read_tuple_group<R: BufRead>(
    class: &InteractionClass,
    reader: &mut LineReader<R>,
    strict: bool,
) -> Result<Vec<usize>, InputError> {
    let line = reader.require_line(&format!("a {} table entry", class.kind().table_name()))?;
    if !starts_with_marker(&line) {
        return Ok(vec![resolve_tabulated(class, &line, reader, strict)?]);
    }

    let mut group = vec![resolve_tabulated(class, &line, reader, strict)?];
    loop {
        if !reader.peek_line()?.is_some_and(starts_with_marker) {
            break;
        }
        let Some(next) = reader.next_line()? else {
            break;
        };
        let index = resolve_tabulated(class, &next, reader, strict)?;
        if group.contains(&index) {
            return Err(duplicate(class, index, reader));
        }
        group.push(index);
    }
    Ok(group)
}

fn duplicate<R: BufRead>(
    class: &InteractionClass,
    index: usize,
    reader: &LineReader<R>,
) -> InputError {
    reader.error(ParseErrorKind::DuplicateTable {
        class: class.kind().full_name(),
        types: class.interaction_name(index, " "),
    })
}

fn resolve_tabulated<R: BufRead>(
    class: &InteractionClass,
    line: &str,
    reader: &LineReader<R>,
    strict: bool,
) -> Result<usize, InputError> {
    let kind = class.kind();
    let tokens: Vec<&str> = line
        .split_whitespace()
        .skip_while(|&token| token == TYPES_MARKER)
        .collect();
    let n_body = kind.n_body();
    if tokens.len() < n_body {
        return Err(reader.error(ParseErrorKind::TooFewFields {
            class: kind.full_name(),
            expected: n_body,
            found: tokens.len(),
        }));
    }

    let index = lookup_tuple(class, &tokens[..n_body], reader, strict)?;
    if !class.interactions()[index].is_tabulated() {
        return Err(reader.error(ParseErrorKind::NotTabulated {
            class: kind.full_name(),
            types: tokens[..n_body].join(" "),
        }));
    }
    if class.table(index).is_some() {
        return Err(duplicate(class, index, reader));
    }
    Ok(index)
}

/// Reads a `<lower> <upper>` line and its control points.
fn read_block<R: BufRead>(
    reader: &mut LineReader<R>,
    binwidth: f64,
) -> Result<ExternalSplineTable, InputError> {
    let line = reader.require_line("a table range line")?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(reader.error(ParseErrorKind::TooFewFields {
            class: "table range",
            expected: 2,
            found: tokens.len(),
        }));
    }
    let lower = parse_number("table lower cutoff", tokens[0]).map_err(|e| reader.error(e))?;
    let upper = parse_number("table upper cutoff", tokens[1]).map_err(|e| reader.error(e))?;

    let n_points = ExternalSplineTable::expected_points(lower, upper, binwidth);
    let mut coefficients = Vec::with_capacity(n_points);
    for _ in 0..n_points {
        let line = reader.require_line("a table coefficient")?;
        let token = line.split_whitespace().next().unwrap_or_default();
        coefficients.push(parse_number("table coefficient", token).map_err(|e| reader.error(e))?);
    }

    Ok(ExternalSplineTable {
        lower,
        upper,
        binwidth,
        coefficients,
    })
}
