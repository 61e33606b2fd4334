// claimstar-core/src/domain/gold/calendar.rs

use chrono::{Datelike, Months, NaiveDate, Weekday};

use crate::domain::audit::{AuditStamp, GoldRow, add_audit_columns};
use crate::domain::dimension::{Dimension, add_unknown_member};
use crate::domain::table::{Column, ColumnType, Record, Value};

/// Natural key of the unknown date; also the key of every missing fact date.
pub const UNKNOWN_DATE_KEY: &str = "9999-12-31";

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Canonical `YYYY-MM-DD` key of a fact date.
pub fn date_key(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => UNKNOWN_DATE_KEY.to_string(),
    }
}

/// Inclusive calendar range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Min/max over every observed date; `None` when nothing was observed.
    pub fn observed(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        dates.into_iter().fold(None, |range, d| match range {
            None => Some(Self { start: d, end: d }),
            Some(r) => Some(Self {
                start: r.start.min(d),
                end: r.end.max(d),
            }),
        })
    }

    /// 2020-01-01 through one year past `today`.
    pub fn default_until(today: NaiveDate) -> Self {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN);
        let end = today.checked_add_months(Months::new(12)).unwrap_or(today);
        Self {
            start: start.min(end),
            end,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimDate {
    pub date_sk: i64,
    pub date_key: String,
    pub year: i32,
    pub quarter: u32,
    pub month: u32,
    pub day: u32,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u32,
    pub day_name: String,
    pub month_name: String,
    /// ISO 8601 week number.
    pub week_of_year: u32,
    pub is_weekend: bool,
}

impl DimDate {
    fn from_date(date_sk: i64, date: NaiveDate) -> Self {
        let day_of_week = date.weekday().num_days_from_monday();
        Self {
            date_sk,
            date_key: date_key(Some(date)),
            year: date.year(),
            quarter: date.month0() / 3 + 1,
            month: date.month(),
            day: date.day(),
            day_of_week,
            day_name: DAY_NAMES[day_of_week as usize].to_string(),
            month_name: MONTH_NAMES[date.month0() as usize].to_string(),
            week_of_year: date.iso_week().week(),
            is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }
}

impl Dimension for DimDate {
    const SENTINEL: &'static str = UNKNOWN_DATE_KEY;

    fn surrogate_key(&self) -> i64 {
        self.date_sk
    }

    fn natural_key(&self) -> &str {
        &self.date_key
    }

    fn unknown_member(surrogate_key: i64, natural_key: &str) -> Self {
        Self {
            date_sk: surrogate_key,
            date_key: natural_key.to_string(),
            year: 9999,
            quarter: 99,
            month: 99,
            day: 99,
            day_of_week: 9,
            day_name: "Unknown".to_string(),
            month_name: "Unknown".to_string(),
            week_of_year: 99,
            is_weekend: false,
        }
    }
}

/// One row per day of `range`, keyed by the 1-based offset from its start.
pub fn create_dim_date(range: DateRange, stamp: AuditStamp) -> Vec<GoldRow<DimDate>> {
    let days = range
        .days()
        .zip(1_i64..)
        .map(|(date, sk)| DimDate::from_date(sk, date))
        .collect();
    add_audit_columns(add_unknown_member(days), stamp)
}

impl Record for DimDate {
    fn columns() -> Vec<Column> {
        vec![
            Column::required("date_sk", ColumnType::BigInt),
            Column::required("date_key", ColumnType::Varchar(10)),
            Column::nullable("year", ColumnType::SmallInt),
            Column::nullable("quarter", ColumnType::SmallInt),
            Column::nullable("month", ColumnType::SmallInt),
            Column::nullable("day", ColumnType::SmallInt),
            Column::nullable("day_of_week", ColumnType::SmallInt),
            Column::nullable("day_name", ColumnType::Varchar(10)),
            Column::nullable("month_name", ColumnType::Varchar(10)),
            Column::nullable("week_of_year", ColumnType::SmallInt),
            Column::nullable("is_weekend", ColumnType::Boolean),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.date_sk.into(),
            (&self.date_key).into(),
            self.year.into(),
            self.quarter.into(),
            self.month.into(),
            self.day.into(),
            self.day_of_week.into(),
            (&self.day_name).into(),
            (&self.month_name).into(),
            self.week_of_year.into(),
            self.is_weekend.into(),
        ]
    }
}
