//! Collection query parameters
//!
//! `page[number]`, `page[size]`, `sort=-createdAt,name`, `filter[<key>]=<value>`

use axum::extract::{FromRequestParts, OriginalUri, Query};
use http::request::Parts;
use shared::error::AppError;
use shared::jsonapi::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use std::collections::HashMap;

use crate::db::repository::{ListParams, Page, Sort};

/// 解析后的集合查询参数
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Page,
    /// `(field, descending)`，尚未经过白名单校验
    sort: Vec<(String, bool)>,
    filters: HashMap<String, String>,
    /// 集合路径 + 非分页参数，用于拼接分页链接
    pub base: String,
}

impl ListQuery {
    pub fn parse(path: &str, raw_query: Option<&str>, pairs: Vec<(String, String)>) -> Result<Self, AppError> {
        let mut number = 1u32;
        let mut size = DEFAULT_PAGE_SIZE;
        let mut sort = Vec::new();
        let mut filters = HashMap::new();

        for (key, value) in pairs {
            match key.as_str() {
                "page[number]" => number = parse_positive("page[number]", &value)?,
                "page[size]" => size = parse_positive("page[size]", &value)?.min(MAX_PAGE_SIZE),
                "sort" => {
                    sort = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| match s.strip_prefix('-') {
                            Some(field) => (field.to_string(), true),
                            None => (s.to_string(), false),
                        })
                        .collect();
                }
                _ => {
                    if let Some(name) = key.strip_prefix("filter[").and_then(|k| k.strip_suffix(']')) {
                        if !value.is_empty() {
                            filters.insert(name.to_string(), value);
                        }
                    }
                }
            }
        }

        Ok(Self {
            page: Page { number, size },
            sort,
            filters,
            base: base_link(path, raw_query),
        })
    }

    /// 按白名单把 wire 字段映射为列名；未知字段返回 400
    pub fn sort_by(&self, allowed: &[(&str, &'static str)]) -> Result<Vec<Sort>, AppError> {
        self.sort
            .iter()
            .map(|(field, descending)| {
                allowed
                    .iter()
                    .find(|(name, _)| *name == field.as_str())
                    .map(|(_, column)| Sort {
                        column: *column,
                        descending: *descending,
                    })
                    .ok_or_else(|| {
                        AppError::invalid_request(format!("Sorting by {field} is not supported"))
                    })
            })
            .collect()
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// 通用参数：分页 + 排序 + `filter[name]`
    pub fn params(&self, allowed_sort: &[(&str, &'static str)]) -> Result<ListParams, AppError> {
        Ok(ListParams {
            page: self.page,
            sort: self.sort_by(allowed_sort)?,
            name: self.filter("name").map(str::to_string),
        })
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u32, AppError> {
    match value.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(AppError::invalid_request(format!(
            "{key} must be a positive integer"
        ))),
    }
}

/// 去掉原始查询串中的分页参数 (保持原有编码)
fn base_link(path: &str, raw_query: Option<&str>) -> String {
    let kept: Vec<&str> = raw_query
        .unwrap_or_default()
        .split('&')
        .filter(|seg| !seg.is_empty())
        .filter(|seg| {
            let lower = seg.to_ascii_lowercase();
            !(lower.starts_with("page[") || lower.starts_with("page%5b"))
        })
        .collect();
    if kept.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", kept.join("&"))
    }
}

impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::invalid_request(e.body_text()))?;
        // nest() 会剥掉路由前缀，分页链接需要完整路径
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        Self::parse(uri.path(), uri.query(), pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let q = ListQuery::parse("/api/v2/tags", None, vec![]).unwrap();
        assert_eq!(q.page, Page { number: 1, size: 15 });
        assert_eq!(q.base, "/api/v2/tags");
        assert!(q.sort_by(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_page_size_is_capped() {
        let q = ListQuery::parse(
            "/api/v2/tags",
            None,
            pairs(&[("page[number]", "3"), ("page[size]", "500")]),
        )
        .unwrap();
        assert_eq!(q.page, Page { number: 3, size: 100 });
    }

    #[test]
    fn test_invalid_page_number() {
        assert!(ListQuery::parse("/x", None, pairs(&[("page[number]", "0")])).is_err());
        assert!(ListQuery::parse("/x", None, pairs(&[("page[size]", "abc")])).is_err());
    }

    #[test]
    fn test_sort_whitelist() {
        let q = ListQuery::parse("/x", None, pairs(&[("sort", "-createdAt,name")])).unwrap();
        let allowed = [("name", "name"), ("createdAt", "created_at")];
        let sort = q.sort_by(&allowed).unwrap();
        assert_eq!(
            sort,
            vec![
                Sort { column: "created_at", descending: true },
                Sort { column: "name", descending: false },
            ]
        );

        let q = ListQuery::parse("/x", None, pairs(&[("sort", "password")])).unwrap();
        assert!(q.sort_by(&allowed).is_err());
    }

    #[test]
    fn test_filters_and_base_link() {
        let raw = "filter%5Bstatus%5D=draft&page%5Bnumber%5D=2&sort=name";
        let q = ListQuery::parse(
            "/api/v2/items",
            Some(raw),
            pairs(&[("filter[status]", "draft"), ("page[number]", "2"), ("sort", "name"), ("filter[name]", "")]),
        )
        .unwrap();
        assert_eq!(q.filter("status"), Some("draft"));
        assert_eq!(q.filter("name"), None);
        assert_eq!(q.base, "/api/v2/items?filter%5Bstatus%5D=draft&sort=name");
    }
}
