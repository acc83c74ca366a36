use std::collections::HashSet;

use anyhow::{Context, Result, anyhow};

use fbref_stats::catalog::{Category, League, league_by_comp_id};
use fbref_stats::config::AppConfig;
use fbref_stats::http_client::HttpPageSource;
use fbref_stats::ingest::{IngestPlan, ingest_stats};
use fbref_stats::logging::init_logging;
use fbref_stats::roster::load_roster;
use fbref_stats::season::current_season;
use fbref_stats::store;

fn main() -> Result<()> {
    init_logging()?;
    let config = AppConfig::load()?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let run_roster = has_flag(&args, "--roster");
    let run_stats = has_flag(&args, "--stats");
    if !run_roster && !run_stats {
        return Err(anyhow!(
            "nothing to do: pass --roster and/or --stats [--leagues=9,12] [--categories=shooting,gca] [--no-delay]"
        ));
    }

    let mut conn = store::open_db(&config.database)?;
    let source = HttpPageSource::new(config.request_timeout)?;

    if run_roster {
        let summary = load_roster(&mut conn, &source).context("roster pass failed")?;
        println!(
            "Roster: {} teams seen, {} inserted",
            summary.teams_seen, summary.teams_inserted
        );
    }

    if run_stats {
        let mut plan = IngestPlan {
            league_delay: config.league_delay,
            ..IngestPlan::default()
        };
        if let Some(raw) = arg_value(&args, "--leagues") {
            plan.leagues = parse_leagues(&raw)?;
        }
        if let Some(raw) = arg_value(&args, "--categories") {
            plan.categories = parse_categories(&raw)?;
        }
        if has_flag(&args, "--no-delay") {
            plan.league_delay = std::time::Duration::ZERO;
        }

        let season = current_season();
        let summary = ingest_stats(&mut conn, &source, &plan, &season)?;

        println!("Stats ingest complete for season {}", summary.season);
        println!("Records appended: {}", summary.records_appended);
        for item in &summary.per_league {
            println!(
                "{}: categories {}/{} records={}",
                item.league, item.categories_succeeded, item.categories_total, item.records_appended
            );
            for err in item.errors.iter().take(6) {
                println!("   - {err}");
            }
        }
    }

    Ok(())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            if !raw.trim().is_empty() {
                return Some(raw.trim().to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn parse_leagues(raw: &str) -> Result<Vec<League>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for part in raw.split([',', ';', ' ']).filter(|p| !p.trim().is_empty()) {
        let id = part
            .trim()
            .parse::<u32>()
            .with_context(|| format!("invalid league id '{part}'"))?;
        let league = league_by_comp_id(id).ok_or_else(|| anyhow!("unknown league id {id}"))?;
        if seen.insert(id) {
            out.push(*league);
        }
    }
    if out.is_empty() {
        return Err(anyhow!("no league ids in '{raw}'"));
    }
    Ok(out)
}

fn parse_categories(raw: &str) -> Result<Vec<Category>> {
    let mut out = Vec::new();
    for part in raw.split([',', ';', ' ']).filter(|p| !p.trim().is_empty()) {
        let category =
            Category::from_any_slug(part).ok_or_else(|| anyhow!("unknown category '{part}'"))?;
        if !out.contains(&category) {
            out.push(category);
        }
    }
    if out.is_empty() {
        return Err(anyhow!("no categories in '{raw}'"));
    }
    Ok(out)
}
