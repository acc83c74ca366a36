use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use crate::catalog::{BIG5_ROSTER_URL, BIG5_TABLE_ID, league_for_country_code};
use crate::error::ScrapeError;
use crate::html_table::{ParsedTable, parse_table};
use crate::http_client::PageSource;
use crate::store::{Team, insert_team_if_absent};
use crate::team_identity::team_identity;

const COUNTRY_COLUMN: &str = "country";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSummary {
    pub teams_seen: usize,
    pub teams_inserted: usize,
}

/// Reads every team off the Big-5 roster table.
///
/// The country cell renders as a flag code followed by the upper-case code
/// (`"es ESP"`); the last token picks the league. The cell is found by its
/// own `data-stat`, falling back to header position for unattributed rows.
pub fn roster_teams(table: &ParsedTable) -> Result<Vec<Team>, ScrapeError> {
    let mut out = Vec::with_capacity(table.rows.len());
    for (row_index, row) in table.rows.iter().enumerate() {
        let identity = team_identity(table, row_index)?;
        let code = row
            .stat(COUNTRY_COLUMN)
            .or_else(|| table.cell(row, COUNTRY_COLUMN))
            .and_then(|text| text.split_whitespace().last())
            .ok_or_else(|| ScrapeError::malformed(&table.id, row_index, "row has no country"))?;
        let league = league_for_country_code(code).ok_or_else(|| {
            ScrapeError::malformed(&table.id, row_index, format!("unknown country code '{code}'"))
        })?;
        out.push(Team {
            id: identity.id,
            name: identity.name,
            league: league.name.to_string(),
        });
    }
    Ok(out)
}

/// The one-off roster pass. Teams already stored are left untouched, so a
/// rerun after a failure is safe.
pub fn load_roster(conn: &mut Connection, source: &dyn PageSource) -> Result<RosterSummary> {
    let html = source.fetch(BIG5_ROSTER_URL)?;
    let table = parse_table(&html, BIG5_TABLE_ID)?;
    let teams = roster_teams(&table)?;

    let tx = conn.transaction()?;
    let mut summary = RosterSummary {
        teams_seen: teams.len(),
        teams_inserted: 0,
    };
    for team in &teams {
        if insert_team_if_absent(&tx, team)? {
            summary.teams_inserted += 1;
        }
    }
    tx.commit()?;

    info!(
        seen = summary.teams_seen,
        inserted = summary.teams_inserted,
        "roster loaded"
    );
    Ok(summary)
}
