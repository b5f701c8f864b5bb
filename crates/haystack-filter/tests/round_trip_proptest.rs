//! Property-based tests for filter rendering.
//!
//! Random filters are generated as text, parsed, rendered and parsed again.
//! Rendering must be stable and must never lose structure.

use haystack_filter_rs::filter::{generate_v3, parse, render};
use haystack_model_rs::DefNamespace;
use proptest::prelude::*;

const KEYWORDS: [&str; 5] = ["and", "or", "not", "true", "false"];

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,6}".prop_filter("keywords are not tag names", |s| {
        !KEYWORDS.contains(&s.as_str())
    })
}

fn path() -> impl Strategy<Value = String> {
    prop::collection::vec(ident(), 1..4).prop_map(|segments| segments.join("->"))
}

fn literal() -> impl Strategy<Value = String> {
    prop_oneof![
        (-10_000i64..10_000, prop::sample::select(vec!["", "kW", "°F", "%", "m²"]))
            .prop_map(|(n, unit)| format!("{n}{unit}")),
        "[a-zA-Z0-9_]{0,8}".prop_map(|s| format!("\"{s}\"")),
        "[a-z][a-z0-9-]{0,5}".prop_map(|id| format!("@{id}")),
        any::<bool>().prop_map(|b| b.to_string()),
        (2000u32..2030, 1u32..13, 1u32..29)
            .prop_map(|(y, m, d)| format!("{y}-{m:02}-{d:02}")),
        prop::sample::select(vec!["INF", "-INF", "NaN"]).prop_map(str::to_string),
        "[a-z:/`\\\\]{0,8}".prop_map(|s| {
            let escaped = s.replace('\\', "\\\\").replace('`', "\\`");
            format!("`{escaped}`")
        }),
    ]
}

fn term() -> impl Strategy<Value = String> {
    let op = prop::sample::select(vec!["==", "!=", "<", "<=", ">", ">="]);
    prop_oneof![
        path(),
        path().prop_map(|p| format!("not {p}")),
        (path(), op, literal()).prop_map(|(p, op, v)| format!("{p} {op} {v}")),
        ident().prop_map(|name| format!("^{name}")),
        (ident(), prop::option::of(ident()), prop::option::of(ident())).prop_map(
            |(rel, term, target)| {
                let mut text = format!("{rel}?");
                if let Some(term) = term {
                    text.push_str(&format!(" ^{term}"));
                }
                if let Some(target) = target {
                    text.push_str(&format!(" @{target}"));
                }
                text
            }
        ),
        (path(), ident()).prop_map(|(p, target)| format!("{p} *== @{target}")),
    ]
}

fn filter() -> impl Strategy<Value = String> {
    term().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} and {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} or {b}")),
            inner.prop_map(|a| format!("({a})")),
        ]
    })
}

proptest! {
    #[test]
    fn generated_filters_parse(text in filter()) {
        prop_assert!(parse(&text).is_ok(), "failed to parse {text}");
    }

    #[test]
    fn render_is_canonical(text in filter()) {
        let node = parse(&text).unwrap();
        let rendered = render(&node);
        prop_assert_eq!(&rendered, &text);
        prop_assert_eq!(parse(&rendered).unwrap(), node);
    }

    #[test]
    fn render_survives_extra_whitespace(text in filter()) {
        let spaced = text.replace(' ', "   ").replace('(', "( ").replace(')', " )");
        let node = parse(&spaced).unwrap();
        prop_assert_eq!(render(&node), render(&parse(&text).unwrap()));
    }

    #[test]
    fn legacy_output_parses(text in filter()) {
        let node = parse(&text).unwrap();
        let lowered = generate_v3(&node, &DefNamespace::new());
        prop_assert!(parse(&lowered.filter).is_ok(), "bad v3 output {}", lowered.filter);
    }
}
