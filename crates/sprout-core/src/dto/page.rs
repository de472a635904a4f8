use crate::dto::prelude::*;

///
/// Page
/// Cursor-based pagination envelope
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub cursor: Option<String>,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, cursor: Option<String>) -> Self {
        Self { items, cursor }
    }

    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.cursor.is_none()
    }
}

///
/// PageRequest
/// Pagination envelope to avoid passing raw cursors and sizes around
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub page_size: Option<u32>,
}

impl PageRequest {
    #[must_use]
    pub const fn first(page_size: u32) -> Self {
        Self {
            cursor: None,
            page_size: Some(page_size),
        }
    }

    #[must_use]
    pub fn after(cursor: impl Into<String>, page_size: u32) -> Self {
        Self {
            cursor: Some(cursor.into()),
            page_size: Some(page_size),
        }
    }
}
