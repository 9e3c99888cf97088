use serde::Deserialize;

use crate::error::AppError;
use crate::listing::{ListQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Query string accepted by every list route.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub q: Option<String>,
    pub is_active: Option<bool>,
    pub brand_ids: Option<String>,
    pub category_ids: Option<String>,
    pub warehouse_ids: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl TryFrom<ListParams> for ListQuery {
    type Error = AppError;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let mut query = ListQuery::default();
        query.set_text(params.q.as_deref().unwrap_or_default().trim());
        query.set_active_only(params.is_active.unwrap_or(false));
        query.set_brands(parse_ids("brandIds", params.brand_ids.as_deref())?);
        query.set_categories(parse_ids("categoryIds", params.category_ids.as_deref())?);
        query.set_warehouses(parse_ids("warehouseIds", params.warehouse_ids.as_deref())?);

        let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(AppError::validation(format!(
                "pageSize must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        query.set_page_size(page_size);
        query.set_page(params.page.unwrap_or(1));
        Ok(query)
    }
}

fn parse_ids(name: &str, raw: Option<&str>) -> Result<Vec<i64>, AppError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::validation(format!("{name} must be a comma separated list of ids")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_params_into_query() {
        let params = ListParams {
            q: Some(" blender ".into()),
            is_active: Some(true),
            brand_ids: Some("3, 1,3".into()),
            page: Some(4),
            page_size: Some(50),
            ..ListParams::default()
        };
        let query = ListQuery::try_from(params).unwrap();
        assert_eq!(query.q, "blender");
        assert!(query.active_only);
        assert_eq!(query.brand_ids, vec![1, 3]);
        assert_eq!(query.page, 4);
        assert_eq!(query.page_size, 50);
    }

    #[test]
    fn rejects_bad_ids_and_page_sizes() {
        let params = ListParams {
            category_ids: Some("1,x".into()),
            ..ListParams::default()
        };
        assert!(ListQuery::try_from(params).is_err());

        let params = ListParams {
            page_size: Some(0),
            ..ListParams::default()
        };
        assert!(ListQuery::try_from(params).is_err());
    }
}
