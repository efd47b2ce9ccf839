//! Ids of existing records for update and delete runs.

use std::collections::VecDeque;

use super::{Payload, PayloadProducer};
use crate::operations::OperationKind;

/// Hands out each preloaded id once.
#[derive(Debug, Default)]
pub struct ExistingIds {
    ids: VecDeque<String>,
    loaded: usize,
}

impl ExistingIds {
    /// Serves `ids` in order.
    pub fn new(ids: impl IntoIterator<Item = String>) -> Self {
        let ids: VecDeque<String> = ids.into_iter().collect();
        let loaded = ids.len();
        Self { ids, loaded }
    }

    /// Ids not yet handed out.
    pub fn remaining(&self) -> usize {
        self.ids.len()
    }

    /// Ids loaded at construction.
    pub fn loaded(&self) -> usize {
        self.loaded
    }
}

impl PayloadProducer for ExistingIds {
    fn produce(&mut self, _kind: OperationKind, count: usize) -> Vec<Payload> {
        let take = count.min(self.ids.len());
        self.ids.drain(..take).map(Payload::Target).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("gid://shopify/Product/{i}")).collect()
    }

    #[test]
    fn test_hands_out_each_id_once() {
        let mut producer = ExistingIds::new(ids(5));
        let first = producer.produce(OperationKind::Delete, 3);
        let second = producer.produce(OperationKind::Delete, 3);
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 2);
        assert_eq!(first[0], Payload::Target("gid://shopify/Product/1".into()));
        assert_eq!(second[1], Payload::Target("gid://shopify/Product/5".into()));
        assert_eq!(producer.remaining(), 0);
        assert_eq!(producer.loaded(), 5);
    }

    #[test]
    fn test_empty_source_returns_nothing() {
        let mut producer = ExistingIds::default();
        assert!(producer.produce(OperationKind::Update, 10).is_empty());
    }
}
