//! Page-number pagination over ordered sequences.
//!
//! A [`Page`] is a bounded, read-only view over an ordered collection plus
//! navigation metadata. It is built either from an in-memory slice
//! ([`paginate_slice`]) or from a sea-orm query ([`paginate_query`], which
//! wraps the ORM's [`Paginator`](sea_orm::Paginator)). Both apply the same
//! rules:
//!
//! - a missing, blank or non-integer page parameter means page 1;
//! - page numbers below 1 mean page 1;
//! - page numbers past the end mean the last page;
//! - an empty sequence still has one (empty) page.

use std::ops::RangeInclusive;

use sea_orm::{ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, Select};
use serde::Serialize;
use yatube_common::{AppError, AppResult};

/// Number of posts shown on one page of any listing.
pub const POSTS_PER_PAGE: u64 = 10;

/// A requested 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PageNumber(u64);

impl PageNumber {
    /// The first page.
    pub const FIRST: Self = Self(1);

    /// Create a page number, treating 0 as the first page.
    #[must_use]
    pub const fn new(number: u64) -> Self {
        if number == 0 { Self::FIRST } else { Self(number) }
    }

    /// Parse the raw `page` query parameter.
    ///
    /// An integer too large to represent asks for the last page.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::FIRST;
        };
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || negative {
            return Self::FIRST;
        }
        digits.parse::<u64>().map_or(Self(u64::MAX), Self::new)
    }

    /// The 1-based number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// One page of an ordered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    items: Vec<T>,
    number: u64,
    num_pages: u64,
    count: u64,
    per_page: u64,
}

impl<T> Page<T> {
    fn new(items: Vec<T>, number: u64, count: u64, per_page: u64) -> Self {
        Self {
            items,
            number,
            num_pages: num_pages(count, per_page),
            count,
            per_page,
        }
    }

    /// Items on this page, in source order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 1-based index of this page.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// Total number of pages, at least 1.
    #[must_use]
    pub const fn num_pages(&self) -> u64 {
        self.num_pages
    }

    /// Total number of items across all pages.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Page size the page was cut with.
    #[must_use]
    pub const fn per_page(&self) -> u64 {
        self.per_page
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    #[must_use]
    pub const fn next_page_number(&self) -> Option<u64> {
        if self.has_next() {
            Some(self.number + 1)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn previous_page_number(&self) -> Option<u64> {
        if self.has_previous() {
            Some(self.number - 1)
        } else {
            None
        }
    }

    /// 1-based position of the first item on this page within the whole
    /// collection, or 0 when the collection is empty.
    #[must_use]
    pub const fn start_index(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            (self.number - 1) * self.per_page + 1
        }
    }

    /// 1-based position of the last item on this page, or 0 when empty.
    #[must_use]
    pub fn end_index(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.start_index() + self.items.len() as u64 - 1
        }
    }

    /// All page numbers, for rendering navigation.
    #[must_use]
    pub const fn page_range(&self) -> RangeInclusive<u64> {
        1..=self.num_pages
    }

    /// Convert the items while keeping the navigation metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
        }
    }

    /// Fallible [`Page::map`]; stops at the first error.
    pub fn try_map<U, E, F>(self, f: F) -> Result<Page<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
        })
    }
}

const fn num_pages(count: u64, per_page: u64) -> u64 {
    if count == 0 { 1 } else { count.div_ceil(per_page) }
}

/// Cut one page out of an in-memory, already ordered sequence.
#[must_use]
pub fn paginate_slice<T: Clone>(items: &[T], page: PageNumber, per_page: u64) -> Page<T> {
    let per_page = per_page.max(1);
    let count = items.len() as u64;
    let number = page.get().min(num_pages(count, per_page));

    let start = usize::try_from((number - 1) * per_page).unwrap_or(usize::MAX);
    let end = usize::try_from(number * per_page).unwrap_or(usize::MAX);
    let slice = items
        .get(start.min(items.len())..end.min(items.len()))
        .unwrap_or_default();

    Page::new(slice.to_vec(), number, count, per_page)
}

/// Cut one page out of an ordered query using the ORM paginator.
///
/// Issues a count query first so the requested page can be clamped, then
/// fetches only the rows of that page.
pub async fn paginate_query<'db, C, E>(
    db: &'db C,
    query: Select<E>,
    page: PageNumber,
    per_page: u64,
) -> AppResult<Page<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Sized + Send + Sync + 'db,
{
    let per_page = per_page.max(1);
    let paginator = query.paginate(db, per_page);

    let totals = paginator
        .num_items_and_pages()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let number = page.get().min(num_pages(totals.number_of_items, per_page));

    let items = paginator
        .fetch_page(number - 1)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Page::new(items, number, totals.number_of_items, per_page))
}
