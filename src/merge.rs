use std::collections::{HashMap, HashSet};

use crate::normalize::{StatRecord, StatValue};

const FOR_SUFFIX: &str = "_for";
const AGAINST_SUFFIX: &str = "_against";

/// One team's combined "for" and "against" row of a category for a season.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub team_id: String,
    pub season: String,
    pub values: Vec<(String, StatValue)>,
}

impl MergedRecord {
    pub fn get(&self, label: &str) -> Option<&StatValue> {
        self.values
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value)
    }

    /// All stored column names in order: `team_id`, the stats, then `season`.
    pub fn column_names(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.values.len() + 2);
        names.push("team_id");
        names.extend(self.values.iter().map(|(name, _)| name.as_str()));
        names.push("season");
        names
    }
}

/// Inner-joins the two perspectives of a category on team id.
///
/// Output follows the order of `for_records`. Labels present on both sides
/// get `_for` / `_against` suffixes; the rest keep their name. A team that
/// appears on only one side is dropped without notice, which matches what the
/// stored data has always looked like.
pub fn merge_category(
    for_records: &[StatRecord],
    against_records: &[StatRecord],
    season: &str,
) -> Vec<MergedRecord> {
    let shared = shared_labels(for_records, against_records);

    let mut against_by_team: HashMap<&str, Vec<&StatRecord>> = HashMap::new();
    for rec in against_records {
        against_by_team.entry(rec.team_id.as_str()).or_default().push(rec);
    }

    let mut out = Vec::new();
    for left in for_records {
        let Some(matches) = against_by_team.get(left.team_id.as_str()) else {
            continue;
        };
        for right in matches {
            let mut values = Vec::with_capacity(left.values.len() + right.values.len());
            values.extend(suffixed(&left.values, &shared, FOR_SUFFIX));
            values.extend(suffixed(&right.values, &shared, AGAINST_SUFFIX));
            out.push(MergedRecord {
                team_id: left.team_id.clone(),
                season: season.to_string(),
                values,
            });
        }
    }
    out
}

fn shared_labels<'a>(left: &'a [StatRecord], right: &'a [StatRecord]) -> HashSet<&'a str> {
    let left_labels = left.iter().flat_map(|r| r.labels()).collect::<HashSet<_>>();
    right
        .iter()
        .flat_map(|r| r.labels())
        .filter(|label| left_labels.contains(label))
        .collect()
}

fn suffixed<'a>(
    values: &'a [(String, StatValue)],
    shared: &'a HashSet<&str>,
    suffix: &'a str,
) -> impl Iterator<Item = (String, StatValue)> + 'a {
    values.iter().map(move |(label, value)| {
        let name = if shared.contains(label.as_str()) {
            format!("{label}{suffix}")
        } else {
            label.clone()
        };
        (name, value.clone())
    })
}
