//! Property-based tests for the import and lint pipelines.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use claywork::core::prefixes::{uri_to_url, url_to_uri};
use claywork::core::types::DispatchEntry;
use claywork::import::bootstrap::parse;
use claywork::import::dispatch::DispatchPipeline;
use claywork::import::publish::{PublishExpander, WritePlan};
use claywork::import::InputFormat;
use claywork::rest::mock::MockRest;

/// One generated component: optional default data plus instances.
#[derive(Debug, Clone)]
struct Component {
    defaults: Option<i64>,
    instances: BTreeMap<String, i64>,
}

/// One generated bootstrap document.
#[derive(Debug, Clone)]
struct Bootstrap {
    components: BTreeMap<String, Component>,
    pages: BTreeMap<String, i64>,
}

fn component() -> impl Strategy<Value = Component> {
    (
        proptest::option::of(any::<i64>()),
        prop::collection::btree_map("[a-z][a-z0-9]{0,3}", any::<i64>(), 0..4),
    )
        .prop_map(|(defaults, instances)| Component {
            defaults,
            instances,
        })
}

fn bootstrap() -> impl Strategy<Value = Bootstrap> {
    (
        prop::collection::btree_map("[a-z]{1,6}", component(), 0..4),
        prop::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..3),
    )
        .prop_map(|(components, pages)| Bootstrap { components, pages })
}

impl Bootstrap {
    fn to_yaml(&self) -> String {
        let mut components = Map::new();
        for (name, component) in &self.components {
            let mut data = Map::new();
            if let Some(v) = component.defaults {
                data.insert("v".to_string(), json!(v));
            }
            let instances: Map<String, Value> = component
                .instances
                .iter()
                .map(|(id, v)| (id.clone(), json!({ "v": v })))
                .collect();
            data.insert("instances".to_string(), Value::Object(instances));
            components.insert(name.clone(), Value::Object(data));
        }
        let pages: Map<String, Value> = self
            .pages
            .iter()
            .map(|(id, v)| (id.clone(), json!({ "v": v })))
            .collect();

        serde_yaml::to_string(&json!({ "_components": components, "_pages": pages }))
            .expect("bootstrap serializes")
    }

    /// URIs this document alone should flatten to.
    fn expected_uris(&self) -> BTreeSet<String> {
        let mut uris = BTreeSet::new();
        for (name, component) in &self.components {
            if component.defaults.is_some() {
                uris.insert(format!("/_components/{}", name));
            }
            for id in component.instances.keys() {
                uris.insert(format!("/_components/{}/instances/{}", name, id));
            }
        }
        for id in self.pages.keys() {
            uris.insert(format!("/_pages/{}", id));
        }
        uris
    }
}

fn parsed_uris(text: &str) -> BTreeSet<String> {
    parse(text, InputFormat::Bootstrap)
        .expect("generated bootstrap parses")
        .into_iter()
        .map(|entry| entry.uri)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Flattening produces exactly the component, instance and page paths.
    #[test]
    fn flatten_matches_paths(doc in bootstrap()) {
        prop_assert_eq!(parsed_uris(&doc.to_yaml()), doc.expected_uris());
    }

    /// Concatenated documents flatten to the union of each document's URIs.
    #[test]
    fn concatenation_is_union(docs in prop::collection::vec(bootstrap(), 1..4)) {
        let text = docs
            .iter()
            .map(Bootstrap::to_yaml)
            .collect::<Vec<_>>()
            .join("---\n");
        let expected: BTreeSet<String> = docs
            .iter()
            .flat_map(Bootstrap::expected_uris)
            .collect();

        prop_assert_eq!(parsed_uris(&text), expected);
    }

    /// Qualifying a site-relative URI and expanding it lands on the same URL.
    #[test]
    fn uri_url_roundtrip(host in "[a-z]{1,8}\\.com", path in "/_components/[a-z]{1,6}") {
        let prefix = format!("http://{}", host);
        let qualified = format!("{}{}", host, path);
        prop_assert_eq!(uri_to_url(&prefix, &path), uri_to_url(&prefix, &qualified));
        prop_assert_eq!(url_to_uri(&uri_to_url(&prefix, &path)), qualified);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// The dispatch pipeline never exceeds its bound, published copies included.
    #[test]
    fn dispatch_respects_bound(bound in 1usize..6, count in 1usize..24, publish in any::<bool>()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let rest = MockRest::new().with_latency(Duration::from_millis(1));
        let expander = PublishExpander::new(publish);
        let plans: Vec<WritePlan> = (0..count)
            .map(|i| expander.expand(DispatchEntry::new(format!("/_components/c{}", i), json!({}))))
            .collect();

        let events = rt.block_on(
            DispatchPipeline::new(Arc::new(rest.clone()), "http://domain.com")
                .with_concurrency(bound)
                .run(plans),
        );

        let per_entry = if publish { 2 } else { 1 };
        prop_assert_eq!(events.len(), count * per_entry);
        prop_assert!(rest.max_in_flight() <= bound);
    }
}
