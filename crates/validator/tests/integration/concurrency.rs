//! Fan-out, slow validators and the custom validator cap.

use crate::support::{compile, summary};
use async_trait::async_trait;
use lattice_validator::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Barrier;

const FIELDS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

fn six_fields<V>(make: impl Fn(usize) -> V) -> Arc<Schema>
where
    V: CustomValidator + Clone + 'static,
{
    let def = FIELDS
        .iter()
        .enumerate()
        .fold(TypeDef::document("load"), |def, (i, name)| {
            let validator = make(i);
            def.field(
                *name,
                TypeDef::of("string")
                    .validation(Validation::rule(move |rule| rule.custom(validator.clone()))),
            )
        });
    compile(Schema::builder().define(def))
}

fn load_document() -> Value {
    json!({
        "_id": "load-1",
        "_type": "load",
        "a": "1", "b": "2", "c": "3", "d": "4", "e": "5", "f": "6"
    })
}

/// Passes once every sibling has started.
#[derive(Clone)]
struct Gate(Arc<Barrier>);

#[async_trait]
impl CustomValidator for Gate {
    async fn validate(&self, _: Option<&Value>, _: &ValidationContext<'_>) -> anyhow::Result<Verdict> {
        self.0.wait().await;
        Ok(Verdict::Valid)
    }
}

#[tokio::test]
async fn sibling_fields_run_concurrently() {
    let barrier = Arc::new(Barrier::new(FIELDS.len()));
    let validator = DocumentValidator::new(six_fields(|_| Gate(barrier.clone()))).unwrap();

    let markers = tokio::time::timeout(Duration::from_secs(5), validator.validate(&load_document()))
        .await
        .expect("siblings should not wait on each other");
    assert!(markers.is_empty());
}

/// Sleeps, then fails with its label.
#[derive(Clone)]
struct Sleepy {
    delay: Duration,
    label: String,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait]
impl CustomValidator for Sleepy {
    async fn validate(&self, _: Option<&Value>, _: &ValidationContext<'_>) -> anyhow::Result<Verdict> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.label.clone().into())
    }
}

struct Counters {
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Counters {
    fn new() -> Self {
        Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn sleepy(&self, delay: Duration, label: &str) -> Sleepy {
        Sleepy {
            delay,
            label: label.to_owned(),
            in_flight: self.in_flight.clone(),
            peak: self.peak.clone(),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn markers_follow_declaration_order_not_completion_order() {
    let counters = Counters::new();
    let schema = six_fields(|i| {
        let delay = Duration::from_millis(60 - 10 * i as u64);
        counters.sleepy(delay, FIELDS[i])
    });
    let validator = DocumentValidator::new(schema).unwrap();

    let markers = validator.validate(&load_document()).await;
    let expected: Vec<_> = FIELDS
        .iter()
        .map(|name| (path![*name], Level::Error, (*name).to_owned()))
        .collect();
    assert_eq!(summary(&markers), expected);
    assert_eq!(counters.peak.load(Ordering::SeqCst), FIELDS.len());
}

#[tokio::test(start_paused = true)]
async fn slow_validators_are_awaited() {
    let counters = Counters::new();
    let schema = compile(
        Schema::builder().define(TypeDef::document("load").field(
            "a",
            TypeDef::of("string").validation(Validation::rule({
                let slow = counters.sleepy(Duration::from_secs(12), "took a while");
                move |rule| rule.custom(slow.clone())
            })),
        )),
    );
    let validator = DocumentValidator::new(schema)
        .unwrap()
        .with_options(ValidationOptions::default().with_slow_custom_warning(Duration::from_secs(5)));

    let markers = validator.validate(&json!({"_type": "load", "a": "x"})).await;
    assert_eq!(
        summary(&markers),
        vec![(path!["a"], Level::Error, "took a while".to_owned())]
    );
}

#[tokio::test(start_paused = true)]
async fn custom_validators_respect_the_cap() {
    let counters = Counters::new();
    let schema = six_fields(|_| counters.sleepy(Duration::from_millis(10), "done"));
    let validator = DocumentValidator::new(schema)
        .unwrap()
        .with_options(ValidationOptions::default().with_max_custom_concurrency(2));

    let markers = validator.validate(&load_document()).await;
    assert_eq!(markers.len(), FIELDS.len());
    assert_eq!(counters.peak.load(Ordering::SeqCst), 2);
    assert_eq!(counters.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn zero_concurrency_still_makes_progress() {
    let counters = Counters::new();
    let schema = six_fields(|_| counters.sleepy(Duration::from_millis(1), "done"));
    let validator = DocumentValidator::new(schema)
        .unwrap()
        .with_options(ValidationOptions::default().with_concurrency(0));

    let markers = validator.validate(&load_document()).await;
    assert_eq!(markers.len(), FIELDS.len());
    assert_eq!(counters.peak.load(Ordering::SeqCst), 1);
}
