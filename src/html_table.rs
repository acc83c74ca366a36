//! Table extraction from FBref markup.
//!
//! FBref tables carry a multi-row `<thead>`; only the last header row has the
//! `data-stat` attributes that make usable column names. Headers and body rows
//! are read together from one table element so their order cannot drift apart.

use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub id: String,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<String>,
    /// `data-stat` of each cell, parallel to `cells`.
    pub stat_keys: Vec<Option<String>>,
    /// `href` of the first hyperlink anywhere in the row.
    pub link: Option<String>,
}

impl ParsedTable {
    /// Cell text of `column` in `row`, if both exist.
    pub fn cell<'a>(&self, row: &'a TableRow, column: &str) -> Option<&'a str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        row.cells.get(idx).map(String::as_str)
    }
}

impl TableRow {
    /// Cell text by its own `data-stat`, independent of header layout.
    pub fn stat(&self, key: &str) -> Option<&str> {
        let idx = self
            .stat_keys
            .iter()
            .position(|k| k.as_deref() == Some(key))?;
        self.cells.get(idx).map(String::as_str)
    }
}

pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// Convenience for a single lookup; callers reading several tables from one
/// page should parse once with [`parse_document`] and call [`extract_table`].
pub fn parse_table(html: &str, table_id: &str) -> Result<ParsedTable, ScrapeError> {
    extract_table(&parse_document(html), table_id)
}

pub fn extract_table(document: &Html, table_id: &str) -> Result<ParsedTable, ScrapeError> {
    let table_sel = selector("table")?;
    let table = document
        .select(&table_sel)
        .find(|el| el.value().attr("id") == Some(table_id))
        .ok_or_else(|| ScrapeError::TableNotFound {
            table_id: table_id.to_string(),
        })?;

    let header_row_sel = selector("thead tr")?;
    let header_cell_sel = selector("th")?;
    let body_row_sel = selector("tbody tr")?;
    let cell_sel = selector("th, td")?;
    let link_sel = selector("a[href]")?;

    let columns = table
        .select(&header_row_sel)
        .last()
        .map(|row| {
            row.select(&header_cell_sel)
                .map(|th| {
                    th.value()
                        .attr("data-stat")
                        .map(str::to_string)
                        .unwrap_or_else(|| element_text(&th))
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let rows = table
        .select(&body_row_sel)
        .map(|tr| {
            let cells = tr.select(&cell_sel).collect::<Vec<_>>();
            TableRow {
                cells: cells.iter().map(element_text).collect(),
                stat_keys: cells
                    .iter()
                    .map(|c| c.value().attr("data-stat").map(str::to_string))
                    .collect(),
                link: tr
                    .select(&link_sel)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string),
            }
        })
        .collect();

    Ok(ParsedTable {
        id: table_id.to_string(),
        columns,
        rows,
    })
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector(css.to_string()))
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::{ParsedTable, parse_table};
    use crate::error::ScrapeError;

    const PAGE: &str = r#"
        <html><body>
        <table id="other"><tbody><tr><td>x</td></tr></tbody></table>
        <table id="stats_squads_standard_for">
          <thead>
            <tr><th colspan="2"></th><th colspan="1">Performance</th></tr>
            <tr>
              <th data-stat="team">Squad</th>
              <th data-stat="players_used"># Pl</th>
              <th data-stat="goals">Gls</th>
            </tr>
          </thead>
          <tbody>
            <tr>
              <th data-stat="team"><a href="/en/squads/abc123/Some-Team-Stats">Some Team</a></th>
              <td data-stat="players_used">24</td>
              <td data-stat="goals"> 1,204 </td>
            </tr>
            <tr>
              <th data-stat="team">No Link FC</th>
              <td data-stat="players_used">20</td>
              <td data-stat="goals"></td>
            </tr>
          </tbody>
        </table>
        </body></html>
    "#;

    fn table() -> ParsedTable {
        parse_table(PAGE, "stats_squads_standard_for").expect("table should parse")
    }

    #[test]
    fn uses_last_header_row_data_stat() {
        assert_eq!(table().columns, vec!["team", "players_used", "goals"]);
    }

    #[test]
    fn reads_rows_cells_and_first_link() {
        let t = table();
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].cells, vec!["Some Team", "24", "1,204"]);
        assert_eq!(
            t.rows[0].link.as_deref(),
            Some("/en/squads/abc123/Some-Team-Stats")
        );
        assert_eq!(t.rows[1].link, None);
        assert_eq!(t.cell(&t.rows[1], "goals"), Some(""));
        assert_eq!(t.cell(&t.rows[1], "assists"), None);
        assert_eq!(t.rows[0].stat("goals"), Some("1,204"));
        assert_eq!(t.rows[0].stat("team"), Some("Some Team"));
        assert_eq!(t.rows[0].stat("assists"), None);
    }

    #[test]
    fn cell_outlives_table_borrow() {
        let row = {
            let t = table();
            t.rows[0].clone()
        };
        let t = table();
        let goals = t.cell(&row, "goals");
        drop(t);
        assert_eq!(goals, Some("1,204"));
    }

    #[test]
    fn missing_table_is_reported() {
        let err = parse_table(PAGE, "stats_squads_gca_for").unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::TableNotFound { ref table_id } if table_id == "stats_squads_gca_for"
        ));
    }
}
