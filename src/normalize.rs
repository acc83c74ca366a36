use serde::Serialize;

use crate::error::ScrapeError;
use crate::html_table::ParsedTable;
use crate::team_identity::team_identity;

/// Columns dropped from every category table: squad size, minutes per game,
/// 90s played, and the raw squad name (the team id replaces it).
pub const EXCLUDED_COLUMNS: &[&str] = &["players_used", "minutes_per_game", "minutes_90s", "team"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl StatValue {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return StatValue::Missing;
        }
        let compact = trimmed.replace(',', "");
        if looks_numeric(&compact) {
            if let Ok(n) = compact.parse::<i64>() {
                return StatValue::Int(n);
            }
            if let Ok(x) = compact.parse::<f64>() {
                return StatValue::Float(x);
            }
        }
        StatValue::Text(trimmed.to_string())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, StatValue::Missing)
    }
}

// Keeps "inf"/"nan" and friends out of the float path.
fn looks_numeric(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

/// One team's row of one category table.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRecord {
    pub team_id: String,
    pub values: Vec<(String, StatValue)>,
}

impl StatRecord {
    pub fn get(&self, label: &str) -> Option<&StatValue> {
        self.values
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }
}

/// Turns every body row into a record keyed by the table's column labels.
///
/// Team id and values are taken from the same row in the same loop.
pub fn normalize_table(table: &ParsedTable) -> Result<Vec<StatRecord>, ScrapeError> {
    let mut out = Vec::with_capacity(table.rows.len());
    for (row_index, row) in table.rows.iter().enumerate() {
        if row.cells.len() != table.columns.len() {
            return Err(ScrapeError::malformed(
                &table.id,
                row_index,
                format!(
                    "row has {} cells, header has {} columns",
                    row.cells.len(),
                    table.columns.len()
                ),
            ));
        }
        let identity = team_identity(table, row_index)?;
        let values = table
            .columns
            .iter()
            .zip(&row.cells)
            .filter(|(label, _)| !EXCLUDED_COLUMNS.contains(&label.as_str()))
            .map(|(label, cell)| (label.clone(), StatValue::parse(cell)))
            .collect();
        out.push(StatRecord {
            team_id: identity.id,
            values,
        });
    }
    Ok(out)
}
