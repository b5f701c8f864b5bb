//! Behavioural tests for the public filter API.
//!
//! Each test exercises parsing, evaluation or rewriting end to end through
//! the crate's public surface only.

use std::sync::Arc;

use haystack_filter_rs::filter::ast::{Conjunction, Disjunction, Has, Missing};
use haystack_filter_rs::filter::token::PathToken;
use haystack_filter_rs::filter::WILDCARD_MAX_DEPTH;
use haystack_filter_rs::prelude::*;
use haystack_model_rs::prelude::*;

fn has(name: &str) -> Node {
    Node::Has(Has::new(PathToken::parse(name).unwrap()))
}

fn missing(name: &str) -> Node {
    Node::Missing(Missing::new(PathToken::parse(name).unwrap()))
}

fn def(name: &str) -> Dict {
    dict! { "def" => Symbol::new(name) }
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_and_binds_tighter_than_or() {
    let node = parse("foo or boo and goo").unwrap();
    let expected = Node::Or(Disjunction::new(vec![
        Conjunction::new(vec![has("foo")]),
        Conjunction::new(vec![has("boo"), has("goo")]),
    ]));
    assert_eq!(node, expected);
}

#[test]
fn test_not_applies_to_the_following_path_only() {
    let node = parse("foo and not boo").unwrap();
    let expected = Node::Or(Disjunction::new(vec![Conjunction::new(vec![
        has("foo"),
        missing("boo"),
    ])]));
    assert_eq!(node, expected);
}

#[test]
fn test_render_round_trips_through_parse() {
    for text in [
        "site and foo or goo",
        "not boo",
        "foo == \"test\"",
        "foo->boo == 23",
        "^ahu",
        "inputs? ^elec @foo",
        "equipRef *== @ahu",
        "(a or b) and not c->d and e != 2024-02-29",
        "time < 10:30:00 and uri == `http://example.com/`",
        "temp >= -12.5°C or pct < 50%",
        r"u == `a\`b` or v == `c\\d`",
        "x == NaN or y < INF or z > -INF",
    ] {
        let node = parse(text).unwrap();
        let rendered = render(&node);
        assert_eq!(rendered, text);
        assert_eq!(parse(&rendered).unwrap(), node);
    }
}

// ============================================================================
// Evaluation
// ============================================================================

fn record_set(records: Vec<Dict>) -> RecordSet {
    records.into_iter().collect()
}

#[test]
fn test_wildcard_on_circular_refs_terminates() {
    let records = record_set(vec![
        dict! { "id" => Ref::new("A"), "equipRef" => Ref::new("B") },
        dict! { "id" => Ref::new("B"), "equipRef" => Ref::new("A") },
    ]);
    let node = parse("equipRef *== @C").unwrap();
    assert!(!records.matches(&node, &Ref::new("A")));
}

#[test]
fn test_paths_fan_out_over_ref_lists() {
    let records = record_set(vec![
        dict! { "id" => Ref::new("ahu") },
        dict! { "id" => Ref::new("duct"), "foo" => "x" },
        dict! {
            "id" => Ref::new("fan"),
            "testRef" => vec![Ref::new("ahu"), Ref::new("duct")],
        },
    ]);
    let fan = Ref::new("fan");
    assert!(records.matches(&parse("testRef->foo").unwrap(), &fan));
    assert!(records.matches(&parse("testRef->foo == \"x\"").unwrap(), &fan));
    assert!(!records.matches(&parse("testRef->foo == \"y\"").unwrap(), &fan));
}

#[test]
fn test_eval_with_closure_resolver() {
    let site = Arc::new(dict! { "id" => Ref::new("s"), "geoCity" => "Richmond" });
    let resolve = |r: &Ref| (r.id == "s").then(|| Arc::clone(&site));
    let equip = dict! { "siteRef" => Ref::new("s") };

    let node = parse("siteRef->geoCity == \"Richmond\"").unwrap();
    assert!(node.eval(&EvalContext::new(&equip).with_resolver(&resolve)));
    assert!(!node.eval(&EvalContext::new(&equip)));
}

#[test]
fn test_query_with_namespace() {
    let ns = DefNamespace::from_defs(vec![
        def("equip"),
        def("ahu").with("is", Symbol::new("equip")),
    ])
    .unwrap();
    let records = record_set(vec![
        dict! { "id" => Ref::new("a1"), "ahu" => Value::Marker },
        dict! { "id" => Ref::new("e1"), "equip" => Value::Marker },
        dict! { "id" => Ref::new("p1"), "point" => Value::Marker },
    ]);

    assert_eq!(records.query(&parse("^equip").unwrap(), Some(&ns)).len(), 2);
    assert_eq!(records.query(&parse("^ahu").unwrap(), Some(&ns)).len(), 1);
    assert!(records.query(&parse("^ahu").unwrap(), None).is_empty());
}

// ============================================================================
// Rewriting
// ============================================================================

#[test]
fn test_implied_expansion() {
    let ns = DefNamespace::from_defs(vec![def("impliedTag").with(
        "impliedBy",
        vec![Symbol::new("site"), Symbol::new("zone")],
    )])
    .unwrap();
    let node = parse("impliedTag").unwrap();
    assert_eq!(generate_implied(&node, &ns), "(impliedTag or (site and zone))");
}

#[test]
fn test_legacy_wildcard_is_bounded() {
    let node = parse("equipRef *== @ahu").unwrap();
    let lowered = generate_v3(&node, &DefNamespace::new());

    let expected: Vec<String> = (1..=WILDCARD_MAX_DEPTH)
        .map(|depth| format!("{} == @ahu", vec!["equipRef"; depth].join("->")))
        .collect();
    assert_eq!(lowered.filter, format!("({})", expected.join(" or ")));
    assert!(!lowered.requery);

    // The lowered filter is plain v3 and parses back.
    let reparsed = parse(&lowered.filter).unwrap();
    assert_eq!(render(&reparsed), lowered.filter);
}

#[test]
fn test_legacy_requery_only_for_relationship_refs() {
    let ns = DefNamespace::from_defs(vec![
        def("inputs"),
        def("elecRef").with("inputs", Symbol::new("elec")),
    ])
    .unwrap();

    let without_ref = generate_v3(&parse("inputs?").unwrap(), &ns);
    assert_eq!(without_ref.filter, "elecRef");
    assert!(!without_ref.requery);

    let with_ref = generate_v3(&parse("inputs? @m1").unwrap(), &ns);
    assert_eq!(with_ref.filter, "elecRef");
    assert!(with_ref.requery);
}

// ============================================================================
// Builder
// ============================================================================

#[test]
fn test_builder_rejects_incomplete_filters() {
    let result = FilterBuilder::new().start_parens().has("foo").and().build();
    assert!(result.is_err());
}

#[test]
fn test_eval_nan_literal_matches_nan_value() {
    let record = dict! { "x" => Number::new(f64::NAN) };
    assert!(parse("x == NaN").unwrap().matches(&record));
    assert!(!parse("x != NaN").unwrap().matches(&record));
}

#[test]
fn test_builder_accepts_uris_with_backquotes() {
    let filter = FilterBuilder::new()
        .equals("u", Uri::new("a`b"))
        .build()
        .unwrap();
    assert_eq!(filter, r"u == `a\`b`");
    let node = parse(&filter).unwrap();
    assert!(node.matches(&dict! { "u" => Uri::new("a`b") }));
}

#[test]
fn test_builder_produces_valid_filters() {
    let filter = FilterBuilder::new()
        .has("foo")
        .and()
        .has("goo")
        .and()
        .equals("curVal", Number::with_unit(23.0, "cm"))
        .build()
        .unwrap();
    assert_eq!(filter, "foo and goo and curVal == 23cm");
}
