//! Query-parameter parsing tests: reserved names, sort tokens, field
//! projection and the both-or-neither pagination policy.

use pretty_assertions::assert_eq;

use tracker_api::query::{select_fields, QueryParams};
use tracker_api::repository::{Direction, SortSpec};

fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn reserved_names_never_filter() {
    let params = QueryParams::from_pairs(pairs(&[
        ("offset", "10"),
        ("LIMIT", "5"),
        ("Sort", "-name"),
        ("FIELDS", "a,b"),
        ("status", "active"),
    ]));

    assert_eq!(
        params.filter.entries(),
        &[("status".to_string(), "active".to_string())]
    );
    assert_eq!(params.offset, Some(10));
    assert_eq!(params.limit, Some(5));
    assert_eq!(params.sort, vec![SortSpec::desc("name")]);
    assert_eq!(params.fields, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn sort_tokens_carry_direction() {
    let params = QueryParams::from_pairs(pairs(&[("sort", "-created_at,+label,serial")]));

    assert_eq!(
        params.sort,
        vec![
            SortSpec::desc("created_at"),
            SortSpec::asc("label"),
            SortSpec::asc("serial"),
        ]
    );
    // first token is the primary sort key
    assert_eq!(params.sort[0].direction, Direction::Desc);
}

#[test]
fn bare_sign_tokens_are_dropped() {
    let params = QueryParams::from_pairs(pairs(&[("sort", "+,-,label")]));
    assert_eq!(params.sort, vec![SortSpec::asc("label")]);
}

#[test]
fn empty_sort_tokens_are_dropped() {
    let params = QueryParams::from_pairs(pairs(&[("sort", "a,,b")]));
    assert_eq!(params.sort, vec![SortSpec::asc("a"), SortSpec::asc("b")]);
}

#[test]
fn fields_keep_order_and_duplicates() {
    let params = QueryParams::from_pairs(pairs(&[("fields", "a,b,a")]));
    assert_eq!(
        params.fields,
        vec!["a".to_string(), "b".to_string(), "a".to_string()]
    );
}

#[test]
fn absent_fields_parameter_means_all() {
    let params = QueryParams::from_pairs(pairs(&[("status", "active")]));
    assert!(params.fields.is_empty());
}

#[test]
fn non_numeric_offset_is_unset_not_zero() {
    let params = QueryParams::from_pairs(pairs(&[("offset", "abc"), ("limit", "5")]));
    assert_eq!(params.offset, None);
    assert_eq!(params.limit, Some(5));
    // a lone limit must not paginate
    assert_eq!(params.page().bounds(), None);
}

#[test]
fn pagination_needs_both_bounds() {
    let params = QueryParams::from_pairs(pairs(&[("offset", "10"), ("limit", "5")]));
    assert_eq!(params.page().bounds(), Some((10, 5)));

    let lone_offset = QueryParams::from_pairs(pairs(&[("offset", "10")]));
    assert_eq!(lone_offset.page().bounds(), None);
}

#[test]
fn every_non_reserved_pair_filters() {
    let params = QueryParams::from_pairs(pairs(&[
        ("status", "active"),
        ("owner.name", "Ada"),
        ("status", "retired"),
    ]));

    assert_eq!(
        params.filter.entries(),
        &[
            ("status".to_string(), "active".to_string()),
            ("owner.name".to_string(), "Ada".to_string()),
            ("status".to_string(), "retired".to_string()),
        ]
    );
}

#[test]
fn repeated_reserved_parameters_keep_first_value() {
    let params = QueryParams::from_pairs(pairs(&[("limit", "5"), ("limit", "50")]));
    assert_eq!(params.limit, Some(5));
}

#[test]
fn from_request_reads_the_query_string() {
    let req = actix_web::test::TestRequest::get()
        .uri("/api/devices?offset=1&limit=2&sort=-label&status=active")
        .to_http_request();
    let params = QueryParams::from_request(&req).unwrap();

    assert_eq!(params.offset, Some(1));
    assert_eq!(params.limit, Some(2));
    assert_eq!(params.sort, vec![SortSpec::desc("label")]);
    assert_eq!(
        params.filter.entries(),
        &[("status".to_string(), "active".to_string())]
    );
}

#[test]
fn projection_keeps_only_listed_fields() {
    let value = serde_json::json!({"id": 1, "label": "a", "serial": "s"});
    let fields = vec!["label".to_string(), "missing".to_string()];
    let projected = select_fields(value, &fields);
    assert_eq!(projected, serde_json::json!({"label": "a"}));
}

#[test]
fn empty_projection_keeps_everything() {
    let value = serde_json::json!({"id": 1, "label": "a"});
    let projected = select_fields(value.clone(), &[]);
    assert_eq!(projected, value);
}
