//! Team id and display name from FBref squad links.
//!
//! Squad links look like `/en/squads/<id>/<Name-With-Dashes>-Stats`. The site
//! does not document this shape, so everything that depends on it lives here.

use crate::error::ScrapeError;
use crate::html_table::ParsedTable;

const ID_SEGMENT: usize = 3;
const NAME_SEGMENT: usize = 4;
const NAME_SUFFIX: &str = "-Stats";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamIdentity {
    pub id: String,
    pub name: String,
}

/// Splits `href` on `/` and reads the id and name segments.
///
/// Requires at least five segments (the leading empty one included) and a
/// non-empty id segment. Returns the reason as text on failure so callers can
/// attach table and row context.
pub fn team_identity_from_href(href: &str) -> Result<TeamIdentity, String> {
    let segments = href.split('/').collect::<Vec<_>>();
    if segments.len() <= NAME_SEGMENT {
        return Err(format!(
            "team link '{href}' has {} path segments, expected at least {}",
            segments.len(),
            NAME_SEGMENT + 1
        ));
    }
    let id = segments[ID_SEGMENT].trim();
    if id.is_empty() {
        return Err(format!("team link '{href}' has an empty id segment"));
    }
    let name = segments[NAME_SEGMENT].replace(NAME_SUFFIX, "").replace('-', " ");
    Ok(TeamIdentity {
        id: id.to_string(),
        name,
    })
}

/// Identity of the team in body row `row_index` of `table`.
pub fn team_identity(table: &ParsedTable, row_index: usize) -> Result<TeamIdentity, ScrapeError> {
    let row = table
        .rows
        .get(row_index)
        .ok_or_else(|| ScrapeError::malformed(&table.id, row_index, "row index out of range"))?;
    let href = row
        .link
        .as_deref()
        .ok_or_else(|| ScrapeError::malformed(&table.id, row_index, "row has no team link"))?;
    team_identity_from_href(href).map_err(|reason| ScrapeError::malformed(&table.id, row_index, reason))
}
