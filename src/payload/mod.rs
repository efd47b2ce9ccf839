//! Payload producers.
//!
//! A producer supplies the domain data for each batch: product inputs for
//! creates, or ids of existing records for updates and deletes. Producers may
//! run dry; the scheduler treats a short batch as the end of the available data.

mod existing;
mod random;

use serde::Serialize;

use crate::operations::OperationKind;

pub use existing::ExistingIds;
pub use random::RandomProducts;

/// Input for `productCreate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    /// Product title
    pub title: String,
    /// Vendor name
    pub vendor: String,
    /// Product type
    pub product_type: String,
    /// Tags, including the run tag
    pub tags: Vec<String>,
    /// `ACTIVE`, `DRAFT` or `ARCHIVED`
    pub status: String,
}

/// Data for one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// New product data
    Product(ProductInput),
    /// Id of an existing record
    Target(String),
}

/// Source of payloads for the scheduler.
pub trait PayloadProducer: Send {
    /// Returns up to `count` payloads for `kind`. Fewer means the source is exhausted.
    fn produce(&mut self, kind: OperationKind, count: usize) -> Vec<Payload>;
}

impl<F> PayloadProducer for F
where
    F: FnMut(OperationKind, usize) -> Vec<Payload> + Send,
{
    fn produce(&mut self, kind: OperationKind, count: usize) -> Vec<Payload> {
        self(kind, count)
    }
}
