// Offset pagination - fixed-size pages, out-of-range pages are empty

use serde::{Deserialize, Serialize};

/// One page of a feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub object_list: Vec<T>,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }
}

/// `?page=` as sent by the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// 1-based page number; anything missing, non-numeric or below 1 means the first page.
    pub fn number(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: i64,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1) as i64,
        }
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// `(limit, offset)` of the rows that make up page `number`.
    pub fn window(&self, number: i64) -> (i64, i64) {
        let number = number.max(1);
        (self.per_page, (number - 1).saturating_mul(self.per_page))
    }

    pub fn num_pages(&self, count: i64) -> i64 {
        if count <= 0 {
            1
        } else {
            (count + self.per_page - 1) / self.per_page
        }
    }

    pub fn page<T>(&self, number: i64, count: i64, object_list: Vec<T>) -> Page<T> {
        let number = number.max(1);
        let num_pages = self.num_pages(count);
        Page {
            number,
            num_pages,
            count,
            has_next: number < num_pages,
            has_previous: number > 1,
            object_list,
        }
    }
}
