//! Random product data for create runs.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::{Payload, PayloadProducer, ProductInput};
use crate::operations::OperationKind;

const ADJECTIVES: &[&str] = &[
    "Classic", "Vintage", "Modern", "Rustic", "Premium", "Compact", "Deluxe", "Organic",
];
const NOUNS: &[&str] = &[
    "Mug", "Backpack", "Lamp", "Notebook", "Scarf", "Bottle", "Candle", "Planter",
];
const VENDORS: &[&str] = &["Acme", "Northwind", "Globex", "Initech", "Umbrella"];
const PRODUCT_TYPES: &[&str] = &["Home", "Apparel", "Stationery", "Outdoor", "Kitchen"];

/// Generates an endless supply of random draft products.
pub struct RandomProducts {
    rng: StdRng,
    tag: String,
    produced: u64,
}

impl RandomProducts {
    /// Creates a generator; every product is tagged with `tag` so a run's
    /// records can be found (and cleaned up) afterwards.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            tag: tag.into(),
            produced: 0,
        }
    }

    /// Deterministic generator for tests.
    pub fn seeded(tag: impl Into<String>, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            tag: tag.into(),
            produced: 0,
        }
    }

    fn pick(&mut self, choices: &'static [&'static str]) -> &'static str {
        choices.choose(&mut self.rng).copied().unwrap_or("Item")
    }

    fn next_product(&mut self) -> ProductInput {
        self.produced += 1;
        let adjective = self.pick(ADJECTIVES);
        let noun = self.pick(NOUNS);
        let suffix: u32 = self.rng.random_range(1000..10000);
        ProductInput {
            title: format!("{adjective} {noun} {suffix}"),
            vendor: self.pick(VENDORS).to_string(),
            product_type: self.pick(PRODUCT_TYPES).to_string(),
            tags: vec!["bulk-bench".to_string(), self.tag.clone()],
            status: "DRAFT".to_string(),
        }
    }
}

impl PayloadProducer for RandomProducts {
    fn produce(&mut self, _kind: OperationKind, count: usize) -> Vec<Payload> {
        (0..count)
            .map(|_| Payload::Product(self.next_product()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_produces_requested_count() {
        let mut producer = RandomProducts::seeded("run_1", 7);
        let payloads = producer.produce(OperationKind::Create, 25);
        assert_eq!(payloads.len(), 25);
        assert_eq!(producer.produced, 25);
    }

    #[test]
    fn test_products_are_tagged_drafts() {
        let mut producer = RandomProducts::seeded("run_1", 7);
        for payload in producer.produce(OperationKind::Create, 5) {
            match payload {
                Payload::Product(product) => {
                    assert_eq!(product.status, "DRAFT");
                    assert!(product.tags.contains(&"run_1".to_string()));
                    assert!(!product.title.is_empty());
                }
                Payload::Target(_) => panic!("expected product payload"),
            }
        }
    }

    #[test]
    fn test_seeded_generators_agree() {
        let a = RandomProducts::seeded("t", 42).produce(OperationKind::Create, 3);
        let b = RandomProducts::seeded("t", 42).produce(OperationKind::Create, 3);
        assert_eq!(a, b);
    }
}
