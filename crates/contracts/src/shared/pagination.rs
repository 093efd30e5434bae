use serde::{Deserialize, Serialize};

use crate::domain::common::EntityStatus;

/// Page size used when a listing request does not specify one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Listing parameters. `cursor` is opaque and only meaningful to the backend
/// that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
    pub status: Option<EntityStatus>,
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub count: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        let count = items.len();
        Self {
            items,
            next_cursor,
            count,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page::new(self.items.into_iter().map(f).collect(), self.next_cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_matches_items() {
        let page = Page::new(vec![1, 2, 3], Some("c".into()));
        assert_eq!(page.count, 3);

        let json = serde_json::to_value(Page::<i32>::empty()).unwrap();
        assert!(json.get("nextCursor").is_none());
        assert_eq!(json["count"], 0);
    }

    #[test]
    fn test_page_query_parses_status() {
        let q: PageQuery = serde_json::from_str(r#"{"limit":5,"status":"inactive"}"#).unwrap();
        assert_eq!(q.limit, Some(5));
        assert_eq!(q.status, Some(EntityStatus::Inactive));
        assert!(q.cursor.is_none());
    }
}
