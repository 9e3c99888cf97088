use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Filters and paging of a list screen.
///
/// Every filter setter moves back to the first page. Setters return whether
/// the query actually changed, so callers only reload when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub q: String,
    pub active_only: bool,
    pub brand_ids: Vec<i64>,
    pub category_ids: Vec<i64>,
    pub warehouse_ids: Vec<i64>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            active_only: false,
            brand_ids: Vec::new(),
            category_ids: Vec::new(),
            warehouse_ids: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    pub fn set_text(&mut self, q: &str) -> bool {
        if self.q == q {
            return false;
        }
        self.q = q.to_string();
        self.page = 1;
        true
    }

    pub fn set_active_only(&mut self, active_only: bool) -> bool {
        if self.active_only == active_only {
            return false;
        }
        self.active_only = active_only;
        self.page = 1;
        true
    }

    pub fn set_brands(&mut self, ids: Vec<i64>) -> bool {
        Self::replace_ids(&mut self.brand_ids, ids, &mut self.page)
    }

    pub fn set_categories(&mut self, ids: Vec<i64>) -> bool {
        Self::replace_ids(&mut self.category_ids, ids, &mut self.page)
    }

    pub fn set_warehouses(&mut self, ids: Vec<i64>) -> bool {
        Self::replace_ids(&mut self.warehouse_ids, ids, &mut self.page)
    }

    fn replace_ids(slot: &mut Vec<i64>, mut ids: Vec<i64>, page: &mut u32) -> bool {
        ids.sort_unstable();
        ids.dedup();
        if *slot == ids {
            return false;
        }
        *slot = ids;
        *page = 1;
        true
    }

    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if self.page == page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn set_page_size(&mut self, page_size: u32) -> bool {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        if self.page_size == page_size {
            return false;
        }
        self.page_size = page_size;
        self.page = 1;
        true
    }

    /// Query-string pairs understood by the backend list endpoints.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let q = self.q.trim();
        if !q.is_empty() {
            pairs.push(("q".to_string(), q.to_string()));
        }
        if self.active_only {
            pairs.push(("isActive".to_string(), "true".to_string()));
        }
        for (key, ids) in [
            ("brandIds", &self.brand_ids),
            ("categoryIds", &self.category_ids),
            ("warehouseIds", &self.warehouse_ids),
        ] {
            if !ids.is_empty() {
                let joined = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
                pairs.push((key.to_string(), joined));
            }
        }
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("pageSize".to_string(), self.page_size.to_string()));
        pairs
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
            total_pages: 0,
        }
    }
}
