use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use scraper::Html;
use tracing::{info, warn};

use crate::catalog::{Category, LEAGUES, League};
use crate::error::ScrapeError;
use crate::html_table::{extract_table, parse_document};
use crate::http_client::PageSource;
use crate::merge::{MergedRecord, merge_category};
use crate::normalize::normalize_table;
use crate::store::{append_category_records, finish_ingest_run, start_ingest_run};

const DEFAULT_LEAGUE_DELAY: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct IngestPlan {
    pub leagues: Vec<League>,
    pub categories: Vec<Category>,
    /// Pause between leagues; the site rate-limits aggressive clients.
    pub league_delay: Duration,
}

impl Default for IngestPlan {
    fn default() -> Self {
        Self {
            leagues: LEAGUES.to_vec(),
            categories: Category::ALL.to_vec(),
            league_delay: DEFAULT_LEAGUE_DELAY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeagueIngestSummary {
    pub league: String,
    pub categories_total: usize,
    pub categories_succeeded: usize,
    pub records_appended: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub season: String,
    pub categories_succeeded: usize,
    pub records_appended: usize,
    pub per_league: Vec<LeagueIngestSummary>,
}

/// Fetches, merges and appends every planned category for every planned league.
///
/// Each league page is fetched once and shared by all its categories. A fetch
/// failure or a missing table stops that league only; a malformed row skips
/// only its category. Store errors end the run.
pub fn ingest_stats(
    conn: &mut Connection,
    source: &dyn PageSource,
    plan: &IngestPlan,
    season: &str,
) -> Result<IngestSummary> {
    if plan.leagues.is_empty() || plan.categories.is_empty() {
        return Err(anyhow!("ingest plan has no leagues or no categories"));
    }

    let mut per_league = Vec::with_capacity(plan.leagues.len());
    for (idx, league) in plan.leagues.iter().enumerate() {
        if idx > 0 && !plan.league_delay.is_zero() {
            info!(secs = plan.league_delay.as_secs(), "pausing before next league");
            std::thread::sleep(plan.league_delay);
        }
        let summary = ingest_league(conn, source, league, &plan.categories, season)?;
        per_league.push(summary);
    }

    Ok(IngestSummary {
        season: season.to_string(),
        categories_succeeded: per_league.iter().map(|l| l.categories_succeeded).sum(),
        records_appended: per_league.iter().map(|l| l.records_appended).sum(),
        per_league,
    })
}

fn append_in_transaction(
    conn: &mut Connection,
    category: Category,
    records: &[MergedRecord],
) -> Result<usize> {
    let tx = conn.transaction().context("begin append transaction")?;
    let n = append_category_records(&tx, category, records)
        .with_context(|| format!("append {} records", category.table_slug()))?;
    tx.commit().context("commit append transaction")?;
    Ok(n)
}

fn ingest_league(
    conn: &mut Connection,
    source: &dyn PageSource,
    league: &League,
    categories: &[Category],
    season: &str,
) -> Result<LeagueIngestSummary> {
    info!(league = league.name, season, "ingesting league");
    let run_id = start_ingest_run(conn, league.name, season, categories.len())?;

    let mut summary = LeagueIngestSummary {
        league: league.name.to_string(),
        categories_total: categories.len(),
        categories_succeeded: 0,
        records_appended: 0,
        errors: Vec::new(),
    };

    match source.fetch(&league.stats_url()) {
        Ok(html) => {
            let document = parse_document(&html);
            for category in categories {
                match merged_category(&document, *category, season) {
                    Ok(records) => match append_in_transaction(conn, *category, &records) {
                        Ok(n) => {
                            summary.categories_succeeded += 1;
                            summary.records_appended += n;
                        }
                        Err(err) => {
                            // Close the audit row before giving up on the run.
                            summary
                                .errors
                                .push(format!("{}: store: {err:#}", category.table_slug()));
                            finish_ingest_run(
                                conn,
                                run_id,
                                summary.categories_succeeded,
                                summary.records_appended,
                                &summary.errors,
                            )?;
                            return Err(err);
                        }
                    },
                    Err(err) => {
                        warn!(league = league.name, category = category.table_slug(), error = %err, "category failed");
                        summary
                            .errors
                            .push(format!("{}: {err}", category.table_slug()));
                        if err.aborts_league() {
                            break;
                        }
                    }
                }
            }
        }
        Err(err) => {
            warn!(league = league.name, error = %err, "league page unavailable");
            summary.errors.push(err.to_string());
        }
    }

    finish_ingest_run(
        conn,
        run_id,
        summary.categories_succeeded,
        summary.records_appended,
        &summary.errors,
    )?;
    info!(
        league = league.name,
        categories = summary.categories_succeeded,
        records = summary.records_appended,
        errors = summary.errors.len(),
        "league done"
    );
    Ok(summary)
}

/// Normalizes and merges the for/against pair of one category.
pub fn merged_category(
    document: &Html,
    category: Category,
    season: &str,
) -> Result<Vec<MergedRecord>, ScrapeError> {
    let for_table = extract_table(document, &category.for_table_id())?;
    let against_table = extract_table(document, &category.against_table_id())?;
    let for_records = normalize_table(&for_table)?;
    let against_records = normalize_table(&against_table)?;
    Ok(merge_category(&for_records, &against_records, season))
}
