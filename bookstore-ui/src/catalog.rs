//! Catalog Filter Logic
//!
//! Filter values, quick-filter presets and the pagination cursor of the
//! catalog page. Kept free of Leptos types so it can be unit tested.

/// Books per catalog page
pub const PAGE_SIZE: u32 = 10;

/// Debounce for the search text input, in milliseconds
pub const SEARCH_DEBOUNCE_MS: u32 = 320;
/// Debounce for every other filter input, in milliseconds
pub const FILTER_DEBOUNCE_MS: u32 = 280;

const NEW_FROM_YEAR: &str = "2015";
const CLASSIC_TO_YEAR: &str = "1990";
const BUDGET_MAX_PRICE: &str = "500";
const PREMIUM_MIN_PRICE: &str = "1500";

/// Raw filter input values, as typed
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filters {
    pub q: String,
    pub genre_id: String,
    pub author_id: String,
    pub min_price: String,
    pub max_price: String,
    pub min_year: String,
    pub max_year: String,
    pub order_by: String,
}

/// Quick-filter presets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuickFilter {
    /// Published 2015 or later
    New,
    /// Published 1990 or earlier
    Classic,
    /// Up to 500
    Budget,
    /// From 1500
    Premium,
}

/// Checkbox state of the quick filters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuickFilters {
    pub new: bool,
    pub classic: bool,
    pub budget: bool,
    pub premium: bool,
}

/// Sort options offered by the catalog, `(value, label)`
pub const ORDER_OPTIONS: &[(&str, &str)] = &[
    ("", "Default"),
    ("price_asc", "Price: low to high"),
    ("price_desc", "Price: high to low"),
    ("year_desc", "Newest editions first"),
    ("year_asc", "Oldest editions first"),
    ("title_asc", "Title A-Z"),
    ("title_desc", "Title Z-A"),
    ("newest", "Recently added"),
];

fn order_label(value: &str) -> &str {
    ORDER_OPTIONS
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
        .unwrap_or(value)
}

fn as_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.replace(',', ".").parse().ok()
}

/// Display names for the selected genre and author
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterLabels<'a> {
    pub genre: Option<&'a str>,
    pub author: Option<&'a str>,
}

impl Filters {
    /// Apply a quick-filter checkbox change to the inputs and checkboxes
    pub fn apply_quick(&mut self, quick: &mut QuickFilters, kind: QuickFilter, checked: bool) {
        match kind {
            QuickFilter::New => {
                quick.new = checked;
                if checked {
                    quick.classic = false;
                    self.min_year = NEW_FROM_YEAR.to_string();
                    self.max_year.clear();
                } else if self.min_year == NEW_FROM_YEAR {
                    self.min_year.clear();
                }
            }
            QuickFilter::Classic => {
                quick.classic = checked;
                if checked {
                    quick.new = false;
                    self.max_year = CLASSIC_TO_YEAR.to_string();
                    self.min_year.clear();
                } else if self.max_year == CLASSIC_TO_YEAR {
                    self.max_year.clear();
                }
            }
            QuickFilter::Budget => {
                quick.budget = checked;
                if checked {
                    quick.premium = false;
                    self.max_price = BUDGET_MAX_PRICE.to_string();
                } else if self.max_price == BUDGET_MAX_PRICE {
                    self.max_price.clear();
                }
            }
            QuickFilter::Premium => {
                quick.premium = checked;
                if checked {
                    quick.budget = false;
                    self.min_price = PREMIUM_MIN_PRICE.to_string();
                } else if self.min_price == PREMIUM_MIN_PRICE {
                    self.min_price.clear();
                }
            }
        }
    }

    /// Re-derive the checkboxes after the range inputs were edited
    pub fn sync_quick_from_inputs(&self) -> QuickFilters {
        let min_year = as_number(&self.min_year);
        let max_year = as_number(&self.max_year);
        let no_min_year = self.min_year.trim().is_empty();
        let no_max_year = self.max_year.trim().is_empty();

        QuickFilters {
            new: min_year.map_or(false, |y| y >= 2015.0) && no_max_year,
            classic: max_year.map_or(false, |y| y <= 1990.0) && no_min_year,
            budget: as_number(&self.max_price) == Some(500.0),
            premium: as_number(&self.min_price) == Some(1500.0),
        }
    }

    /// Human-readable list of the filters currently in effect
    pub fn describe_active(&self, labels: FilterLabels<'_>) -> Vec<String> {
        let mut active = Vec::new();

        let q = self.q.trim();
        if !q.is_empty() {
            active.push(format!("search \"{}\"", q));
        }
        if !self.genre_id.is_empty() {
            active.push(format!("genre: {}", labels.genre.unwrap_or(self.genre_id.as_str())));
        }
        if !self.author_id.is_empty() {
            active.push(format!("author: {}", labels.author.unwrap_or(self.author_id.as_str())));
        }
        if !self.min_price.trim().is_empty() {
            active.push(format!("price from {}", self.min_price.trim()));
        }
        if !self.max_price.trim().is_empty() {
            active.push(format!("price up to {}", self.max_price.trim()));
        }
        if !self.min_year.trim().is_empty() {
            active.push(format!("year from {}", self.min_year.trim()));
        }
        if !self.max_year.trim().is_empty() {
            active.push(format!("year up to {}", self.max_year.trim()));
        }
        if !self.order_by.is_empty() {
            active.push(format!("sorted by: {}", order_label(&self.order_by)));
        }

        active
    }

    /// Live announcement text for screen readers
    pub fn announcement(&self, labels: FilterLabels<'_>) -> String {
        let active = self.describe_active(labels);
        if active.is_empty() {
            "No filters applied".to_string()
        } else {
            format!("Active filters: {}", active.join(", "))
        }
    }

    /// Query string for `GET /books` on the given 1-based page
    ///
    /// Only non-empty filters are sent.
    pub fn to_query(&self, page: u32) -> String {
        let skip = ((page.max(1) - 1) * PAGE_SIZE).to_string();
        let limit = PAGE_SIZE.to_string();
        let mut params: Vec<(&str, &str)> = Vec::new();

        let fields = [
            ("q", &self.q),
            ("genre_id", &self.genre_id),
            ("author_id", &self.author_id),
            ("min_price", &self.min_price),
            ("max_price", &self.max_price),
            ("min_year", &self.min_year),
            ("max_year", &self.max_year),
            ("order_by", &self.order_by),
        ];
        for (key, value) in fields {
            let value = value.trim();
            if !value.is_empty() {
                params.push((key, value));
            }
        }

        params.push(("skip", &skip));
        params.push(("limit", &limit));

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Catalog pagination cursor
///
/// The API does not report totals; a full page means there may be more.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub has_more: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            has_more: false,
        }
    }
}

impl Pagination {
    pub fn can_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_next(&self) -> bool {
        self.has_more
    }

    /// Move back a page; returns whether the page changed
    pub fn prev(&mut self) -> bool {
        if self.can_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Move forward a page; returns whether the page changed
    pub fn next(&mut self) -> bool {
        if self.can_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Record how many books the last load returned
    pub fn after_load(&mut self, count: usize) {
        self.has_more = count == PAGE_SIZE as usize;
    }

    /// Status line for the pager
    pub fn status(&self) -> String {
        let next = if self.has_more {
            "more pages available"
        } else {
            "end of list"
        };
        format!("Page {}, {}", self.page, next)
    }
}
