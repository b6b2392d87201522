//! Query-string parsing.
//!
//! Turns the decoded parameters of a request into typed pagination,
//! sort precedence, a projection list and equality filters. The
//! parameter names `offset`, `limit`, `sort` and `fields` are reserved
//! in any casing; every other parameter becomes a filter entry.
//!
//! Sort syntax: comma-separated tokens, `-token` sorts descending,
//! `+token` and a bare token sort ascending.

use actix_web::HttpRequest;
use serde_json::Value;

use crate::errors::ApiError;
use crate::repository::{Direction, Filter, Page, SortSpec};

const VALUE_DELIMITER: char = ',';

#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub fields: Vec<String>,
    pub sort: Vec<SortSpec>,
    pub filter: Filter,
}

impl QueryParams {
    /// Parse the decoded query pairs of a request.
    pub fn from_request(req: &HttpRequest) -> Result<Self, ApiError> {
        let pairs = actix_web::web::Query::<Vec<(String, String)>>::from_query(req.query_string())
            .map_err(|e| ApiError::BadRequest {
                reason: format!("malformed query string: {e}"),
            })?
            .into_inner();
        Ok(Self::from_pairs(pairs))
    }

    /// Parse an already-decoded parameter list. The first occurrence
    /// wins for reserved names; every non-reserved pair filters.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut offset_raw: Option<String> = None;
        let mut limit_raw: Option<String> = None;
        let mut sort_raw: Option<String> = None;
        let mut fields_raw: Option<String> = None;
        let mut filter = Filter::new();

        for (name, value) in pairs {
            match name.to_ascii_lowercase().as_str() {
                "offset" => {
                    offset_raw.get_or_insert(value);
                }
                "limit" => {
                    limit_raw.get_or_insert(value);
                }
                "sort" => {
                    sort_raw.get_or_insert(value);
                }
                "fields" => {
                    fields_raw.get_or_insert(value);
                }
                _ => filter.push(name, value),
            }
        }

        Self {
            // a non-numeric offset/limit means "unset", not an error
            offset: offset_raw.and_then(|v| v.parse().ok()),
            limit: limit_raw.and_then(|v| v.parse().ok()),
            fields: fields_raw.map(parse_fields).unwrap_or_default(),
            sort: sort_raw.map(|v| parse_sort(&v)).unwrap_or_default(),
            filter,
        }
    }

    /// Pagination window; the repository applies it only when both
    /// bounds are present.
    pub fn page(&self) -> Page {
        Page {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

fn parse_sort(value: &str) -> Vec<SortSpec> {
    value
        .split(VALUE_DELIMITER)
        .filter_map(|token| {
            let (direction, field) = match token.strip_prefix('-') {
                Some(rest) => (Direction::Desc, rest),
                None => (Direction::Asc, token.strip_prefix('+').unwrap_or(token)),
            };
            // a bare sign names nothing sortable
            if field.is_empty() {
                return None;
            }
            Some(SortSpec {
                field: field.to_string(),
                direction,
            })
        })
        .collect()
}

fn parse_fields(value: String) -> Vec<String> {
    value
        .split(VALUE_DELIMITER)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep only the listed keys of a serialized object. An empty list
/// projects everything.
pub fn select_fields(value: Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return value;
    }
    match value {
        Value::Object(map) => {
            let mut picked = serde_json::Map::new();
            for field in fields {
                if let Some(v) = map.get(field) {
                    picked.insert(field.clone(), v.clone());
                }
            }
            Value::Object(picked)
        }
        other => other,
    }
}
