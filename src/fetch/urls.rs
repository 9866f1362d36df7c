// src/fetch/urls.rs

use chrono::NaiveDate;
use url::Url;

use crate::error::{PipelineError, Result};

/// Daily report for `date`: `<base>MM-DD-YYYY.csv`.
pub fn daily_report_url(base: &str, date: NaiveDate) -> Result<Url> {
    let base = Url::parse(base).map_err(|e| PipelineError::Config(format!("{}: {}", base, e)))?;
    let file = format!("{}.csv", date.format("%m-%d-%Y"));
    base.join(&file)
        .map_err(|e| PipelineError::Config(format!("joining {} onto {}: {}", file, base, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_url_uses_month_day_year() {
        let url = daily_report_url(
            "https://github.com/CSSEGISandData/COVID-19/raw/master/csse_covid_19_data/csse_covid_19_daily_reports/",
            NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://github.com/CSSEGISandData/COVID-19/raw/master/csse_covid_19_data/csse_covid_19_daily_reports/04-01-2020.csv"
        );
    }

    #[test]
    fn base_without_trailing_slash_replaces_last_segment() {
        let url = daily_report_url(
            "http://localhost/reports/index",
            NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://localhost/reports/12-31-2020.csv");
    }
}
