//! Universe loading from CSV exports.
//!
//! Advisory platforms export the user's portfolio with arbitrary column
//! headings ("Perf. 3a (EUR)", "perf 3y", ...). Columns are auto-detected
//! from a table of accepted spellings, resolved in two passes: exact
//! case-insensitive match first, substring match second.

use std::collections::HashMap;
use std::io::Read;

use log::info;

use fundscope_market_data::models::isin;
use fundscope_market_data::Period;

use super::model::{UniverseInstrument, UniverseLoadResult};

/// Maximum rows accepted in one universe file.
const MAX_ROWS: usize = 500;

/// Attribute resolved from a spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Isin,
    Name,
    CategoryMorningstar,
    CategorySfdr,
    Perf(Period),
    Ter,
    Var3m,
}

/// Accepted surface spellings per attribute, lower-cased.
fn column_aliases() -> Vec<(Column, Vec<&'static str>)> {
    vec![
        (Column::Isin, vec!["isin", "codice isin", "cod_isin"]),
        (Column::Name, vec!["nome", "name", "denominazione"]),
        (
            Column::CategoryMorningstar,
            vec!["categoria morningstar", "cat. morningstar", "morningstar category"],
        ),
        (Column::CategorySfdr, vec!["categoria sfdr", "sfdr"]),
        (
            Column::Perf(Period::Ytd),
            vec!["perf. ytd (eur)", "perf ytd", "ytd"],
        ),
        (
            Column::Perf(Period::OneMonth),
            vec!["perf. 1m (eur)", "perf 1m", "1m"],
        ),
        (
            Column::Perf(Period::ThreeMonths),
            vec!["perf. 3m (eur)", "perf 3m", "3m"],
        ),
        (
            Column::Perf(Period::SixMonths),
            vec!["perf. 6m (eur)", "perf 6m", "6m"],
        ),
        (
            Column::Perf(Period::OneYear),
            vec!["perf. 1a (eur)", "perf 1a", "perf 1y", "1y"],
        ),
        (
            Column::Perf(Period::ThreeYears),
            vec!["perf. 3a (eur)", "perf 3a", "perf 3y", "3y"],
        ),
        (
            Column::Perf(Period::FiveYears),
            vec!["perf. 5a (eur)", "perf 5a", "perf 5y", "5y"],
        ),
        (
            Column::Perf(Period::SevenYears),
            vec!["perf. 7a (eur)", "perf 7a", "perf 7y", "7y"],
        ),
        (
            Column::Perf(Period::NineYears),
            vec!["perf. 9a (eur)", "perf 9a", "perf 9y", "9y"],
        ),
        (
            Column::Perf(Period::TenYears),
            vec!["perf. 10a (eur)", "perf 10a", "perf 10y", "10y"],
        ),
        (
            Column::Ter,
            vec!["comm. gest.+distr.", "ter", "commissioni", "ongoing charge"],
        ),
        (Column::Var3m, vec!["var adeg. 3m", "var 3m", "var"]),
    ]
}

/// Loads and validates the user's fund universe from a CSV export.
#[derive(Debug, Default)]
pub struct UniverseLoader;

impl UniverseLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a universe from CSV content.
    ///
    /// Parse problems that affect the whole file land in `errors`; per-row
    /// problems (empty or malformed ISIN) land in `warnings` and the row is
    /// skipped, so one bad row never sinks the file.
    pub fn load<R: Read>(&self, reader: R) -> UniverseLoadResult {
        let mut result = UniverseLoadResult::default();

        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = match csv_reader.headers() {
            Ok(headers) => headers.clone(),
            Err(err) => {
                result.errors.push(format!("Cannot read CSV header: {err}"));
                return result;
            }
        };

        let column_map = detect_columns(&headers);
        if !column_map.contains_key(&Column::Isin) {
            result.errors.push(
                "Cannot find an ISIN column. Make sure the file has a column named 'ISIN'."
                    .to_string(),
            );
            return result;
        }

        let rows = match csv_reader.records().collect::<Result<Vec<_>, _>>() {
            Ok(rows) => rows,
            Err(err) => {
                result.errors.push(format!("Cannot read CSV rows: {err}"));
                return result;
            }
        };

        if rows.is_empty() {
            result.errors.push("The file contains no data".to_string());
            return result;
        }
        if rows.len() > MAX_ROWS {
            result.errors.push(format!(
                "Row limit of {MAX_ROWS} exceeded: the file contains {} rows",
                rows.len()
            ));
            return result;
        }

        result.total_rows = rows.len();

        for (row_idx, row) in rows.iter().enumerate() {
            // +2 accounts for the header line and 1-based numbering.
            let row_num = row_idx + 2;

            let raw = get_text(row, &column_map, Column::Isin).unwrap_or_default();
            let code = isin::normalize(&raw);

            if code.is_empty() {
                result
                    .warnings
                    .push(format!("Row {row_num}: empty ISIN, skipped"));
                result.invalid_count += 1;
                continue;
            }
            if !isin::is_valid(&code) {
                result
                    .warnings
                    .push(format!("Row {row_num}: invalid ISIN '{raw}'"));
                result.invalid_count += 1;
                continue;
            }

            result
                .instruments
                .push(row_to_instrument(row, &column_map, code, row_num));
            result.valid_count += 1;
        }

        info!(
            "Universe loaded: {} valid, {} invalid, {} warnings",
            result.valid_count,
            result.invalid_count,
            result.warnings.len()
        );

        result
    }
}

/// Two-pass column detection: exact case-insensitive match, then substring
/// match in either direction. First alias that resolves wins.
fn detect_columns(headers: &csv::StringRecord) -> HashMap<Column, usize> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| collapse_spaces(&h.to_lowercase()))
        .collect();

    let mut map = HashMap::new();

    for (column, aliases) in column_aliases() {
        let exact = aliases.iter().find_map(|alias| {
            normalized.iter().position(|header| header == alias)
        });

        let found = exact.or_else(|| {
            aliases.iter().find_map(|alias| {
                normalized
                    .iter()
                    .position(|header| header.contains(alias) || alias.contains(header.as_str()))
            })
        });

        if let Some(idx) = found {
            map.insert(column, idx);
        }
    }

    map
}

fn collapse_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn get_text(
    row: &csv::StringRecord,
    map: &HashMap<Column, usize>,
    column: Column,
) -> Option<String> {
    let idx = *map.get(&column)?;
    let value = row.get(idx)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a numeric cell. Accepts comma decimals and a trailing percent sign
/// ("2,48%" parses as 0.0248); unparseable cells become `None`.
fn get_number(
    row: &csv::StringRecord,
    map: &HashMap<Column, usize>,
    column: Column,
) -> Option<f64> {
    let text = get_text(row, map, column)?;
    let had_percent = text.ends_with('%');
    let cleaned = text.trim_end_matches('%').trim().replace(',', ".");
    let value = cleaned.parse::<f64>().ok()?;
    if had_percent {
        Some(value / 100.0)
    } else {
        Some(value)
    }
}

fn row_to_instrument(
    row: &csv::StringRecord,
    map: &HashMap<Column, usize>,
    code: String,
    row_num: usize,
) -> UniverseInstrument {
    let mut instrument = UniverseInstrument::new(code);
    instrument.source_row = row_num;
    instrument.name = get_text(row, map, Column::Name);
    instrument.category_morningstar = get_text(row, map, Column::CategoryMorningstar);
    instrument.category_sfdr = get_text(row, map, Column::CategorySfdr);
    for period in Period::ALL {
        instrument
            .performance
            .set(period, get_number(row, map, Column::Perf(period)));
    }
    instrument.ter = get_number(row, map, Column::Ter);
    instrument.var_3m = get_number(row, map, Column::Var3m);
    instrument
}
