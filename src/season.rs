use chrono::{Datelike, Local, NaiveDate};

/// First month of a football season; August through July belong together.
const SEASON_START_MONTH: u32 = 8;

pub fn season_for_date(date: NaiveDate) -> String {
    let year = date.year();
    if date.month() >= SEASON_START_MONTH {
        format!("{}-{}", year, year + 1)
    } else {
        format!("{}-{}", year - 1, year)
    }
}

pub fn current_season() -> String {
    season_for_date(Local::now().date_naive())
}
