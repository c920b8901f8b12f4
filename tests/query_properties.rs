//! Property-based tests (fuzzing) for the query core.
//!
//! Uses proptest to generate random/malformed inputs and verify that
//! parsing, translation, and decoding never panic, only return clean
//! typed errors, and that the structural invariants hold for all inputs.
//!
//! Run with: `cargo test --test query_properties`

use proptest::prelude::*;
use serde_json::{json, Value};

use docsearch::{
    bind, by_example, decode_response, parse_bindings, parsed_from, where_, Constraint,
    DocumentSink, DocumentWrite, MemoryEngine, QueryError, SearchClient,
};

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Generate arbitrary JSON values (including shapes no decoder expects)
fn arbitrary_json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        ".*".prop_map(Value::String),
    ];

    leaf.prop_recursive(
        4,  // depth
        64, // max nodes
        8,  // items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::hash_map(".*", inner, 0..8)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        },
    )
}

/// Generate well-formed constraint trees through the public constructors
fn constraint_strategy() -> impl Strategy<Value = Constraint> {
    let leaf = prop_oneof![
        "[a-z/]{1,12}".prop_map(Constraint::directory),
        "[a-z]{1,12}".prop_map(Constraint::collection),
        ("[a-z]{1,8}", "[a-z ]{0,12}").prop_map(|(f, v)| Constraint::value(f, v.as_str())),
        ("[a-z]{1,8}", any::<i64>()).prop_map(|(f, n)| Constraint::value(f, n)),
        ("[a-z]{1,8}", "[a-z]{1,12}").prop_map(|(f, t)| Constraint::word(f, t)),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4)
                .prop_map(|cs| Constraint::all_of(cs).unwrap()),
            prop::collection::vec(inner.clone(), 1..4)
                .prop_map(|cs| Constraint::any_of(cs).unwrap()),
            inner.prop_map(Constraint::negate),
        ]
    })
}

// =============================================================================
// Decoder Fuzz Tests
// =============================================================================

proptest! {
    /// The decoder should never panic, whatever the service sends back
    #[test]
    fn fuzz_decoder_total_on_arbitrary_entries(
        entries in prop::collection::vec(arbitrary_json_strategy(), 0..8),
        strict in any::<bool>(),
    ) {
        // Either decodes or fails with a typed error, never panics
        let _ = decode_response(entries, strict);
    }

    /// Lenient decoding never fails and never invents items
    #[test]
    fn prop_lenient_decode_is_infallible(
        entries in prop::collection::vec(arbitrary_json_strategy(), 0..8),
    ) {
        let len = entries.len();
        let items = decode_response(entries, false).unwrap();
        prop_assert!(items.len() <= len);
    }

    /// Any entry carrying a string uri decodes to a document with that uri
    #[test]
    fn prop_uri_entries_decode_to_documents(uri in ".*") {
        let items = decode_response(vec![json!({"uri": uri})], true).unwrap();
        prop_assert_eq!(items.len(), 1);
        let doc = items[0].as_document().expect("document");
        prop_assert_eq!(&doc.uri, &uri);
    }
}

// =============================================================================
// Parser and Translator Fuzz Tests
// =============================================================================

proptest! {
    /// parsed_from should return typed errors on junk, never panic
    #[test]
    fn fuzz_parser_total_on_arbitrary_text(text in ".*") {
        let bindings = parse_bindings([bind("k").word("field")]).unwrap();
        match parsed_from(&text, &bindings) {
            Ok(_) => {}
            Err(QueryError::Parse { .. }) | Err(QueryError::UnboundConstraint { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error kind: {other:?}"),
        }
    }

    /// Every well-formed "name:token" segment parses through its binding
    #[test]
    fn prop_parser_accepts_well_formed_segments(
        name in "[a-z]{1,8}",
        token in "[A-Za-z0-9]{1,12}",
    ) {
        let bindings = parse_bindings([bind(name.as_str()).word("someField")]).unwrap();
        let text = format!("{name}:{token}");
        let constraint = parsed_from(&text, &bindings).unwrap();
        prop_assert_eq!(constraint, Constraint::word("someField", token));
    }

    /// by_example should accept or reject any JSON without panicking
    #[test]
    fn fuzz_by_example_total_on_arbitrary_json(example in arbitrary_json_strategy()) {
        match by_example(example) {
            Ok(_) => {}
            Err(QueryError::InvalidQuery { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error kind: {other:?}"),
        }
    }
}

// =============================================================================
// Structural Invariants
// =============================================================================

proptest! {
    /// Constraint trees survive a serialization round trip unchanged
    #[test]
    fn prop_constraint_wire_shape_roundtrips(constraint in constraint_strategy()) {
        let wire = serde_json::to_value(&constraint).unwrap();
        let back: Constraint = serde_json::from_value(wire).unwrap();
        prop_assert_eq!(back, constraint);
    }

    /// Builds from the same parts are interchangeable
    #[test]
    fn prop_identical_builds_compare_equal(constraint in constraint_strategy()) {
        let a = where_(constraint.clone()).build().unwrap();
        let b = where_(constraint).build().unwrap();
        prop_assert_eq!(a, b);
    }
}

// =============================================================================
// Engine Execution Properties
// =============================================================================

fn expected_window(total: usize, start: u64, length: Option<u64>) -> usize {
    let available = total.saturating_sub((start - 1) as usize);
    match length {
        Some(length) => available.min(length as usize),
        None => available,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The slice window is exactly the arithmetic window over the
    /// ordered result set, for any start and length
    #[test]
    fn prop_slice_window_arithmetic(
        total in 0usize..20,
        start in 1u64..30,
        length in proptest::option::of(0u64..30),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let got = rt.block_on(async {
            let engine = std::sync::Arc::new(MemoryEngine::new());
            let writes: Vec<DocumentWrite> = (0..total)
                .map(|i| DocumentWrite::new(format!("/w/doc{i}.json"), json!({"i": i})))
                .collect();
            engine.write(writes).await.unwrap();

            let builder = where_(Constraint::directory("/w/"));
            let query = match length {
                Some(length) => builder.slice(start, length),
                None => builder.slice_from(start),
            }
            .build()
            .unwrap();

            let client = SearchClient::new(engine);
            client.query(&query).await.unwrap().len()
        });
        prop_assert_eq!(got, expected_window(total, start, length));
    }

    /// One built query, executed twice over the same documents, yields
    /// the same decoded sequence both times
    #[test]
    fn prop_reexecution_is_deterministic(
        constraint in constraint_strategy(),
        total in 0usize..10,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (first, second) = rt.block_on(async {
            let engine = std::sync::Arc::new(MemoryEngine::new());
            let writes: Vec<DocumentWrite> = (0..total)
                .map(|i| {
                    DocumentWrite::new(
                        format!("/d/doc{i}.json"),
                        json!({"i": i, "tag": if i % 2 == 0 { "even" } else { "odd" }}),
                    )
                })
                .collect();
            engine.write(writes).await.unwrap();

            let query = where_(constraint).build().unwrap();
            let client = SearchClient::new(engine);
            let first = client.query(&query).await.unwrap();
            let second = client.query(&query).await.unwrap();
            (first, second)
        });
        prop_assert_eq!(first, second);
    }
}
