//! Paging and sorting primitives shared by repositories.
//!
//! # Invariants
//! - `PageRequest::size` is always within `1..=MAX_PAGE_SIZE`.
//! - Sort columns come from fixed enums, never from caller text.
//! - Results are totally ordered: `id ASC` is appended as tie-breaker.

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 2000;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Parses `asc` / `desc` case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Lowercase form used in `sort=field,dir` parameters.
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sortable property of an entity.
pub trait SortField: Copy + PartialEq + Sized {
    /// Column name in the backing table.
    fn column(self) -> &'static str;
    /// Public (camelCase) property name.
    fn property(self) -> &'static str;
    /// Maps a public property name back to the field.
    fn parse(property: &str) -> Option<Self>;
    /// The surrogate key field used as tie-breaker.
    fn id() -> Self;
}

/// One `(field, direction)` sort criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order<F> {
    pub field: F,
    pub direction: Direction,
}

/// Zero-based page window plus ordered sort criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F> {
    page: u32,
    size: u32,
    sort: Vec<Order<F>>,
}

impl<F: SortField> PageRequest<F> {
    /// Builds a request; `size` is normalized with `normalize_page_size`.
    pub fn of(page: u32, size: Option<u32>) -> Self {
        Self {
            page,
            size: normalize_page_size(size),
            sort: Vec::new(),
        }
    }

    /// Appends a sort criterion (earlier criteria take precedence).
    pub fn sorted_by(mut self, field: F, direction: Direction) -> Self {
        self.sort.push(Order { field, direction });
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &[Order<F>] {
        &self.sort
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    /// Renders the ` ORDER BY ...` clause.
    pub(crate) fn order_by_sql(&self) -> String {
        let mut terms: Vec<String> = self
            .sort
            .iter()
            .map(|order| format!("{} {}", order.field.column(), order.direction.as_sql()))
            .collect();
        if !self.sort.iter().any(|order| order.field == F::id()) {
            terms.push(format!("{} ASC", F::id().column()));
        }
        format!(" ORDER BY {}", terms.join(", "))
    }
}

impl<F: SortField> Default for PageRequest<F> {
    fn default() -> Self {
        Self::of(0, None)
    }
}

/// One page of results plus totals for navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    content: Vec<T>,
    number: u32,
    size: u32,
    total_elements: u64,
}

impl<T> Page<T> {
    pub(crate) fn new<F>(content: Vec<T>, request: &PageRequest<F>, total_elements: u64) -> Self {
        Self {
            content,
            number: request.page,
            size: request.size,
            total_elements,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Zero-based page number.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }
}

/// Normalizes page size: `None`/`0` -> default, above max -> max.
pub fn normalize_page_size(size: Option<u32>) -> u32 {
    match size {
        Some(0) | None => DEFAULT_PAGE_SIZE,
        Some(value) if value > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
        Some(value) => value,
    }
}
