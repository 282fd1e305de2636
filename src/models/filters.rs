//! Listing parameters: parsing, bounds checking, and page metadata.
//!
//! Sort columns end up in query text, so they only ever come from the closed
//! [`SortColumn`] enum. A raw `sort` value that is not on the allow-list is a
//! validation failure and never reaches the repository.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::validator::{ValidationErrors, Validator};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Title,
    CreatedAt,
    NextReviewDate,
}

impl SortColumn {
    /// Every sortable column. The accepted `sort` keys are exactly their
    /// [`as_sql`](Self::as_sql) names, optionally prefixed with `-`.
    pub const ALL: [SortColumn; 4] = [
        SortColumn::Id,
        SortColumn::Title,
        SortColumn::CreatedAt,
        SortColumn::NextReviewDate,
    ];

    pub fn as_sql(self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Title => "title",
            SortColumn::CreatedAt => "created_at",
            SortColumn::NextReviewDate => "next_review_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            column: SortColumn::CreatedAt,
            direction: SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl FromStr for Sort {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (direction, key) = match s.strip_prefix('-') {
            Some(rest) => (SortDirection::Desc, rest),
            None => (SortDirection::Asc, s),
        };
        let column = SortColumn::ALL
            .into_iter()
            .find(|column| column.as_sql() == key)
            .ok_or_else(|| UnknownSortKey(s.to_string()))?;
        Ok(Self { column, direction })
    }
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: Sort,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: Sort::default(),
        }
    }
}

impl Filters {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    pub fn sort_column(&self) -> &'static str {
        self.sort.column.as_sql()
    }

    pub fn sort_direction(&self) -> &'static str {
        self.sort.direction.as_sql()
    }
}

/// Raw `GET /v1/cards` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCardsQuery {
    pub title: Option<String>,
    pub tags: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

/// Everything the repository needs to run a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSearch {
    pub title: String,
    pub tags: Vec<String>,
    pub filters: Filters,
}

fn read_int(v: &mut Validator, raw: Option<&str>, field: &str, default: i64) -> i64 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => default,
        Some(s) => s.parse().unwrap_or_else(|_| {
            v.add_error(field, "must be an integer value");
            default
        }),
    }
}

fn read_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

impl ListCardsQuery {
    /// Parse and bounds-check every parameter, collecting all failures.
    pub fn resolve(&self) -> Result<CardSearch, ValidationErrors> {
        let mut v = Validator::new();

        let page = read_int(&mut v, self.page.as_deref(), "page", DEFAULT_PAGE);
        let page_size = read_int(&mut v, self.page_size.as_deref(), "page_size", DEFAULT_PAGE_SIZE);

        v.check(page > 0, "page", "must be greater than zero");
        v.check(page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(page_size > 0, "page_size", "must be greater than zero");
        v.check(page_size <= MAX_PAGE_SIZE, "page_size", "must be a maximum of 100");

        let sort = match self.sort.as_deref().unwrap_or("created_at").parse::<Sort>() {
            Ok(sort) => sort,
            Err(_) => {
                v.add_error("sort", "invalid sort value");
                Sort::default()
            }
        };

        v.into_result()?;

        Ok(CardSearch {
            title: self.title.as_deref().unwrap_or("").trim().to_string(),
            tags: read_csv(self.tags.as_deref()),
            filters: Filters {
                page,
                page_size,
                sort,
            },
        })
    }
}

/// Summary of where a page sits in the full result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records == 0 || page_size < 1 {
            return Self::default();
        }
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListCardsQuery {
        let mut q = ListCardsQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "title" => q.title = v,
                "tags" => q.tags = v,
                "page" => q.page = v,
                "page_size" => q.page_size = v,
                "sort" => q.sort = v,
                other => panic!("unknown key {other}"),
            }
        }
        q
    }

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let search = ListCardsQuery::default().resolve().unwrap();
        assert_eq!(search.title, "");
        assert!(search.tags.is_empty());
        assert_eq!(search.filters, Filters::default());
        assert_eq!(search.filters.limit(), 20);
        assert_eq!(search.filters.offset(), 0);
        assert_eq!(search.filters.sort_column(), "created_at");
        assert_eq!(search.filters.sort_direction(), "ASC");
    }

    #[test]
    fn every_column_parses_in_both_directions() {
        for column in SortColumn::ALL {
            let asc: Sort = column.as_sql().parse().unwrap();
            assert_eq!(asc, Sort { column, direction: SortDirection::Asc });

            let desc: Sort = format!("-{}", column.as_sql()).parse().unwrap();
            assert_eq!(desc, Sort { column, direction: SortDirection::Desc });
        }
    }

    #[test]
    fn unknown_sort_key_is_rejected() {
        let errors = query(&[("sort", "not_a_real_column")]).resolve().unwrap_err();
        assert_eq!(errors["sort"], "invalid sort value");

        for bad in ["", "-", "--id", "id; DROP TABLE cards", "Title"] {
            assert!(bad.parse::<Sort>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn offset_and_direction_are_derived() {
        let search = query(&[("page", "3"), ("page_size", "10"), ("sort", "-title")])
            .resolve()
            .unwrap();
        assert_eq!(search.filters.limit(), 10);
        assert_eq!(search.filters.offset(), 20);
        assert_eq!(search.filters.sort_column(), "title");
        assert_eq!(search.filters.sort_direction(), "DESC");
    }

    #[test]
    fn bounds_are_checked_together() {
        let errors = query(&[("page", "0"), ("page_size", "101"), ("sort", "nope")])
            .resolve()
            .unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["page"], "must be greater than zero");
        assert_eq!(errors["page_size"], "must be a maximum of 100");

        let errors = query(&[("page", "10000001")]).resolve().unwrap_err();
        assert_eq!(errors["page"], "must be a maximum of 10 million");

        let ok = query(&[("page", "10000000"), ("page_size", "100")]).resolve();
        assert!(ok.is_ok());
    }

    #[test]
    fn non_numeric_paging_is_a_field_error() {
        let errors = query(&[("page", "two"), ("page_size", "x")]).resolve().unwrap_err();
        assert_eq!(errors["page"], "must be an integer value");
        assert_eq!(errors["page_size"], "must be an integer value");
    }

    #[test]
    fn tags_are_split_on_commas() {
        let search = query(&[("tags", "rust, sql,,  ,go")]).resolve().unwrap();
        assert_eq!(search.tags, vec!["rust", "sql", "go"]);
    }

    #[test]
    fn metadata_for_empty_results_is_zeroed() {
        assert_eq!(Metadata::calculate(0, 4, 20), Metadata::default());
        let zero = Metadata::calculate(0, 1, 10);
        assert_eq!(zero.current_page, 0);
        assert_eq!(zero.page_size, 0);
        assert_eq!(zero.first_page, 0);
        assert_eq!(zero.last_page, 0);
        assert_eq!(zero.total_records, 0);
    }

    #[test]
    fn metadata_rounds_last_page_up() {
        let m = Metadata::calculate(25, 2, 10);
        assert_eq!(m.current_page, 2);
        assert_eq!(m.page_size, 10);
        assert_eq!(m.first_page, 1);
        assert_eq!(m.last_page, 3);
        assert_eq!(m.total_records, 25);

        assert_eq!(Metadata::calculate(20, 1, 10).last_page, 2);
        assert_eq!(Metadata::calculate(1, 1, 100).last_page, 1);
    }
}
