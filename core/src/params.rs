//! Search parameters for the `/event` endpoint.
//!
//! # Design
//! A `Param` is an inert description of one query parameter. Nothing is
//! checked when it is constructed; `Param::apply` validates it and appends
//! it to a `QueryParams`. `search_params` applies every parameter even after
//! a failure, so a caller with three bad inputs gets three errors back.

use chrono::NaiveDate;

use crate::error::{ParamErrors, ValidationError};

/// Ordered multi-map of query parameters.
///
/// Keys may repeat (`keyword=a&keyword=b`). Insertion order is preserved
/// when the collection is encoded into a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Sort order of search results.
///
/// Kept open over the raw code so out-of-range values can be expressed and
/// rejected at validation time, like every other parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy(pub i64);

impl OrderBy {
    /// Most recently updated first.
    pub const UPDATE: OrderBy = OrderBy(1);
    /// By event date.
    pub const DATE: OrderBy = OrderBy(2);
    /// Most recently created first.
    pub const NEWEST: OrderBy = OrderBy(3);

    pub fn code(self) -> i64 {
        self.0
    }

    fn is_known(self) -> bool {
        matches!(self, Self::UPDATE | Self::DATE | Self::NEWEST)
    }
}

/// One query parameter, validated when applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    EventId(i64),
    Keyword(String),
    KeywordOr(String),
    YearMonth { year: i32, month: u32 },
    YearMonthDay { year: i32, month: u32, day: u32 },
    Nickname(String),
    OwnerNickname(String),
    SeriesId(i64),
    Start(i64),
    Order(OrderBy),
    Count(i64),
}

impl Param {
    /// Must be zero or greater.
    pub fn event_id(id: i64) -> Self {
        Param::EventId(id)
    }

    /// Events matching all keywords. Must not be empty.
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Param::Keyword(keyword.into())
    }

    /// Events matching any keyword. Must not be empty.
    pub fn keyword_or(keyword: impl Into<String>) -> Self {
        Param::KeywordOr(keyword.into())
    }

    /// Events held in the given month. Year in `0..=9999`, month in `1..=12`.
    pub fn year_month(year: i32, month: u32) -> Self {
        Param::YearMonth { year, month }
    }

    /// Events held on the given date. The day must exist in that month.
    pub fn year_month_day(year: i32, month: u32, day: u32) -> Self {
        Param::YearMonthDay { year, month, day }
    }

    /// Events the user participates in.
    pub fn nickname(nickname: impl Into<String>) -> Self {
        Param::Nickname(nickname.into())
    }

    /// Events the user administers.
    pub fn owner_nickname(nickname: impl Into<String>) -> Self {
        Param::OwnerNickname(nickname.into())
    }

    pub fn series_id(id: i64) -> Self {
        Param::SeriesId(id)
    }

    /// Offset of the first result.
    pub fn start(start: i64) -> Self {
        Param::Start(start)
    }

    pub fn order(by: OrderBy) -> Self {
        Param::Order(by)
    }

    /// Page size, `1..=100`.
    pub fn count(count: i64) -> Self {
        Param::Count(count)
    }

    /// Query key this parameter is sent under.
    pub fn key(&self) -> &'static str {
        match self {
            Param::EventId(_) => "event_id",
            Param::Keyword(_) => "keyword",
            Param::KeywordOr(_) => "keyword_or",
            Param::YearMonth { .. } => "ym",
            Param::YearMonthDay { .. } => "ymd",
            Param::Nickname(_) => "nickname",
            Param::OwnerNickname(_) => "owner_nickname",
            Param::SeriesId(_) => "series_id",
            Param::Start(_) => "start",
            Param::Order(_) => "order",
            Param::Count(_) => "count",
        }
    }

    /// Validate and append to `params`. Nothing is appended on failure.
    pub fn apply(&self, params: &mut QueryParams) -> Result<(), ValidationError> {
        let value = self.value()?;
        params.append(self.key(), value);
        Ok(())
    }

    fn value(&self) -> Result<String, ValidationError> {
        match self {
            Param::EventId(id) if *id < 0 => Err(ValidationError::EventId(*id)),
            Param::SeriesId(id) if *id < 0 => Err(ValidationError::SeriesId(*id)),
            Param::Start(start) if *start < 0 => Err(ValidationError::Start(*start)),
            Param::EventId(n) | Param::SeriesId(n) | Param::Start(n) => Ok(n.to_string()),

            Param::Keyword(s) | Param::KeywordOr(s) if s.is_empty() => {
                Err(ValidationError::EmptyKeyword)
            }
            Param::Nickname(s) | Param::OwnerNickname(s) if s.is_empty() => {
                Err(ValidationError::EmptyNickname)
            }
            Param::Keyword(s)
            | Param::KeywordOr(s)
            | Param::Nickname(s)
            | Param::OwnerNickname(s) => Ok(s.clone()),

            Param::YearMonth { year, month } => {
                check_year_month(*year, *month)?;
                Ok(format!("{year:04}{month:02}"))
            }
            Param::YearMonthDay { year, month, day } => {
                check_year_month(*year, *month)?;
                if NaiveDate::from_ymd_opt(*year, *month, *day).is_none() {
                    return Err(ValidationError::Day(*day));
                }
                Ok(format!("{year:04}{month:02}{day:02}"))
            }

            Param::Order(by) if !by.is_known() => Err(ValidationError::Order(by.code())),
            Param::Order(by) => Ok(by.code().to_string()),

            Param::Count(count) if !(1..=100).contains(count) => {
                Err(ValidationError::Count(*count))
            }
            Param::Count(count) => Ok(count.to_string()),
        }
    }
}

fn check_year_month(year: i32, month: u32) -> Result<(), ValidationError> {
    if !(0..=9999).contains(&year) {
        return Err(ValidationError::Year(year));
    }
    if !(1..=12).contains(&month) {
        return Err(ValidationError::Month(month));
    }
    Ok(())
}

/// Apply every parameter to a fresh `QueryParams`.
///
/// All parameters are applied even after a failure; if any failed, every
/// error is returned together, in parameter order.
pub fn search_params<I>(params: I) -> Result<QueryParams, ParamErrors>
where
    I: IntoIterator<Item = Param>,
{
    let mut query = QueryParams::new();
    let errors: Vec<ValidationError> = params
        .into_iter()
        .filter_map(|p| p.apply(&mut query).err())
        .collect();

    if errors.is_empty() {
        Ok(query)
    } else {
        Err(ParamErrors::new(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn applied(param: Param) -> Result<QueryParams, ValidationError> {
        let mut query = QueryParams::new();
        param.apply(&mut query)?;
        Ok(query)
    }

    #[test]
    fn non_negative_ids_are_accepted() {
        for n in [0, 1, 42, i64::MAX] {
            assert_eq!(applied(Param::event_id(n)).unwrap().get("event_id"), Some(n.to_string().as_str()));
            assert_eq!(applied(Param::series_id(n)).unwrap().get("series_id"), Some(n.to_string().as_str()));
            assert_eq!(applied(Param::start(n)).unwrap().get("start"), Some(n.to_string().as_str()));
        }
    }

    #[test]
    fn negative_ids_are_rejected() {
        for n in [-1, -100, i64::MIN] {
            assert_eq!(applied(Param::event_id(n)), Err(ValidationError::EventId(n)));
            assert_eq!(applied(Param::series_id(n)), Err(ValidationError::SeriesId(n)));
            assert_eq!(applied(Param::start(n)), Err(ValidationError::Start(n)));
        }
    }

    #[test]
    fn empty_strings_are_rejected() {
        assert_eq!(applied(Param::keyword("")), Err(ValidationError::EmptyKeyword));
        assert_eq!(applied(Param::keyword_or("")), Err(ValidationError::EmptyKeyword));
        assert_eq!(applied(Param::nickname("")), Err(ValidationError::EmptyNickname));
        assert_eq!(applied(Param::owner_nickname("")), Err(ValidationError::EmptyNickname));
    }

    #[test]
    fn strings_are_stored_verbatim() {
        let query = applied(Param::keyword("Rust 東京 & more")).unwrap();
        assert_eq!(query.get("keyword"), Some("Rust 東京 & more"));
        assert_eq!(applied(Param::keyword_or("go")).unwrap().get("keyword_or"), Some("go"));
        assert_eq!(applied(Param::nickname("alice")).unwrap().get("nickname"), Some("alice"));
        assert_eq!(
            applied(Param::owner_nickname("bob")).unwrap().get("owner_nickname"),
            Some("bob")
        );
    }

    #[test]
    fn year_month_is_zero_padded() {
        assert_eq!(applied(Param::year_month(2024, 3)).unwrap().get("ym"), Some("202403"));
        assert_eq!(applied(Param::year_month(7, 12)).unwrap().get("ym"), Some("000712"));
    }

    #[test]
    fn year_month_rejects_out_of_range() {
        assert_eq!(applied(Param::year_month(2023, 13)), Err(ValidationError::Month(13)));
        assert_eq!(applied(Param::year_month(2023, 0)), Err(ValidationError::Month(0)));
        assert_eq!(applied(Param::year_month(10000, 1)), Err(ValidationError::Year(10000)));
        assert_eq!(applied(Param::year_month(-1, 1)), Err(ValidationError::Year(-1)));
    }

    #[test]
    fn year_month_day_honours_leap_years() {
        assert_eq!(applied(Param::year_month_day(2023, 2, 29)), Err(ValidationError::Day(29)));
        assert_eq!(
            applied(Param::year_month_day(2024, 2, 29)).unwrap().get("ymd"),
            Some("20240229")
        );
        assert_eq!(applied(Param::year_month_day(1900, 2, 29)), Err(ValidationError::Day(29)));
        assert!(applied(Param::year_month_day(2000, 2, 29)).is_ok());
    }

    #[test]
    fn year_month_day_rejects_days_outside_month() {
        assert_eq!(applied(Param::year_month_day(2024, 4, 31)), Err(ValidationError::Day(31)));
        assert_eq!(applied(Param::year_month_day(2024, 1, 0)), Err(ValidationError::Day(0)));
        assert_eq!(applied(Param::year_month_day(2024, 13, 1)), Err(ValidationError::Month(13)));
        assert_eq!(
            applied(Param::year_month_day(2024, 1, 5)).unwrap().get("ymd"),
            Some("20240105")
        );
    }

    #[test]
    fn count_bounds() {
        assert_eq!(applied(Param::count(0)), Err(ValidationError::Count(0)));
        assert_eq!(applied(Param::count(101)), Err(ValidationError::Count(101)));
        assert_eq!(applied(Param::count(1)).unwrap().get("count"), Some("1"));
        assert_eq!(applied(Param::count(100)).unwrap().get("count"), Some("100"));
    }

    #[test]
    fn order_accepts_only_known_codes() {
        assert_eq!(applied(Param::order(OrderBy(4))), Err(ValidationError::Order(4)));
        assert_eq!(applied(Param::order(OrderBy(0))), Err(ValidationError::Order(0)));
        assert_eq!(applied(Param::order(OrderBy::UPDATE)).unwrap().get("order"), Some("1"));
        assert_eq!(applied(Param::order(OrderBy::DATE)).unwrap().get("order"), Some("2"));
        assert_eq!(applied(Param::order(OrderBy::NEWEST)).unwrap().get("order"), Some("3"));
    }

    #[test]
    fn aggregation_collects_every_error() {
        let err = search_params([Param::event_id(-1), Param::keyword(""), Param::count(50)]).unwrap_err();
        assert_eq!(
            err.errors(),
            &[ValidationError::EventId(-1), ValidationError::EmptyKeyword]
        );
    }

    #[test]
    fn valid_params_still_apply_alongside_failures() {
        let mut query = QueryParams::new();
        let results: Vec<_> = [Param::event_id(-1), Param::keyword(""), Param::count(50)]
            .iter()
            .map(|p| p.apply(&mut query))
            .collect();
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 2);
        assert_eq!(query.len(), 1);
        assert_eq!(query.get("count"), Some("50"));
    }

    #[test]
    fn no_params_yield_empty_collection() {
        let query = search_params(Vec::new()).unwrap();
        assert!(query.is_empty());
    }

    #[test]
    fn repeated_keys_keep_insertion_order() {
        let query = search_params([
            Param::keyword("rust"),
            Param::count(10),
            Param::keyword("tokio"),
        ])
        .unwrap();
        assert_eq!(query.get_all("keyword").collect::<Vec<_>>(), vec!["rust", "tokio"]);
        assert_eq!(
            query.iter().collect::<Vec<_>>(),
            vec![("keyword", "rust"), ("count", "10"), ("keyword", "tokio")]
        );
    }
}
