//! The fixed set of statistic categories and leagues the pipeline covers.

pub const FBREF_COMPS_URL: &str = "https://fbref.com/en/comps";
pub const BIG5_ROSTER_URL: &str = "https://fbref.com/en/comps/Big5/Big-5-European-Leagues-Stats";
pub const BIG5_TABLE_ID: &str = "big5_table";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Defense,
    Gca,
    Keeper,
    KeeperAdvanced,
    Misc,
    Passing,
    PassingTypes,
    PlayingTime,
    Possession,
    Shooting,
    Standard,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Defense,
        Category::Gca,
        Category::Keeper,
        Category::Misc,
        Category::Passing,
        Category::PassingTypes,
        Category::KeeperAdvanced,
        Category::PlayingTime,
        Category::Possession,
        Category::Shooting,
        Category::Standard,
    ];

    /// Slug FBref uses inside table ids, e.g. `keeper_adv`.
    pub fn table_slug(self) -> &'static str {
        match self {
            Category::Defense => "defense",
            Category::Gca => "gca",
            Category::Keeper => "keeper",
            Category::KeeperAdvanced => "keeper_adv",
            Category::Misc => "misc",
            Category::Passing => "passing",
            Category::PassingTypes => "passing_types",
            Category::PlayingTime => "playing_time",
            Category::Possession => "possession",
            Category::Shooting => "shooting",
            Category::Standard => "standard",
        }
    }

    /// Path segment of the read endpoint, e.g. `keeper-advanced`.
    pub fn route_slug(self) -> &'static str {
        match self {
            Category::KeeperAdvanced => "keeper-advanced",
            Category::PassingTypes => "passing-types",
            Category::PlayingTime => "playing-time",
            other => other.table_slug(),
        }
    }

    pub fn from_route_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.route_slug() == slug)
    }

    /// Accepts either slug form; used by the ingest CLI.
    pub fn from_any_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.route_slug() == slug || c.table_slug() == slug)
    }

    pub fn for_table_id(self) -> String {
        format!("stats_squads_{}_for", self.table_slug())
    }

    pub fn against_table_id(self) -> String {
        format!("stats_squads_{}_against", self.table_slug())
    }

    pub fn store_table(self) -> String {
        format!("team_{}", self.table_slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct League {
    pub comp_id: u32,
    pub name: &'static str,
    /// Path under the comps URL of the league's squad stats page.
    pub path: &'static str,
    /// Country code shown on the Big-5 roster page, if the league is there.
    pub roster_code: Option<&'static str>,
}

impl League {
    pub fn stats_url(&self) -> String {
        format!("{FBREF_COMPS_URL}/{}", self.path)
    }
}

pub const LEAGUES: &[League] = &[
    League {
        comp_id: 9,
        name: "Premier League",
        path: "9/Premier-League-Stats",
        roster_code: Some("ENG"),
    },
    League {
        comp_id: 11,
        name: "Serie A",
        path: "11/Serie-A-Stats",
        roster_code: Some("ITA"),
    },
    League {
        comp_id: 12,
        name: "La Liga",
        path: "12/La-Liga-Stats",
        roster_code: Some("ESP"),
    },
    League {
        comp_id: 13,
        name: "Ligue 1",
        path: "13/Ligue-1-Stats",
        roster_code: Some("FRA"),
    },
    League {
        comp_id: 20,
        name: "Bundesliga",
        path: "20/Bundesliga-Stats",
        roster_code: Some("GER"),
    },
    League {
        comp_id: 21,
        name: "Liga Profesional Argentina",
        path: "21/Liga-Profesional-Argentina-Stats",
        roster_code: None,
    },
];

pub fn league_by_comp_id(comp_id: u32) -> Option<&'static League> {
    LEAGUES.iter().find(|l| l.comp_id == comp_id)
}

pub fn league_for_country_code(code: &str) -> Option<&'static League> {
    LEAGUES.iter().find(|l| l.roster_code == Some(code))
}
