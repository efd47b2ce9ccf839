//! Operation kinds and the GraphQL documents behind them.
//!
//! Each [`OperationKind`] knows its mutation, how to turn a [`Payload`] into
//! variables, and how to read the mutation's root field back into a remote id
//! or a user error. The scheduler is generic over the kind.

use serde::Serialize;
use serde_json::{json, Value};

use crate::payload::Payload;

const PRODUCT_CREATE: &str = "mutation productCreate($product: ProductCreateInput!) {
  productCreate(product: $product) {
    product { id }
    userErrors { field message }
  }
}";

const PRODUCT_UPDATE: &str = "mutation productUpdate($product: ProductUpdateInput!) {
  productUpdate(product: $product) {
    product { id }
    userErrors { field message }
  }
}";

const PRODUCT_DELETE: &str = "mutation productDelete($input: ProductDeleteInput!) {
  productDelete(input: $input) {
    deletedProductId
    userErrors { field message }
  }
}";

const SHOP_NAME: &str = "{ shop { name } }";

pub(crate) const PRODUCT_IDS: &str = "query productIds($first: Int!, $after: String) {
  products(first: $first, after: $after) {
    edges { node { id } }
    pageInfo { hasNextPage endCursor }
  }
}";

/// Bulk operation to run against the product collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum OperationKind {
    /// `productCreate` with random product data
    Create,
    /// `productUpdate` on existing products
    Update,
    /// `productDelete` on existing products
    Delete,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OperationKind {
    /// Lower-case name, as accepted by `--operation`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }

    /// Whether the kind operates on records that must already exist.
    pub fn needs_existing_records(&self) -> bool {
        !matches!(self, OperationKind::Create)
    }

    /// Name of the mutation's root field in the response.
    pub fn root_field(&self) -> &'static str {
        match self {
            OperationKind::Create => "productCreate",
            OperationKind::Update => "productUpdate",
            OperationKind::Delete => "productDelete",
        }
    }

    fn document(&self) -> &'static str {
        match self {
            OperationKind::Create => PRODUCT_CREATE,
            OperationKind::Update => PRODUCT_UPDATE,
            OperationKind::Delete => PRODUCT_DELETE,
        }
    }

    /// Cost assumed for one operation before any real cost has been observed.
    pub fn estimated_cost(&self) -> f64 {
        crate::config::ESTIMATED_MUTATION_COST
    }

    /// Builds the request for one payload.
    ///
    /// A payload of the wrong shape for the kind (e.g. a product input for a
    /// delete) is sent anyway and surfaces as a user error from the API.
    pub fn build_request(&self, payload: &Payload) -> GraphqlRequest {
        let variables = match (self, payload) {
            (OperationKind::Create, Payload::Product(product)) => json!({ "product": product }),
            (OperationKind::Update, Payload::Target(id)) => json!({
                "product": { "id": id, "tags": ["bulk-bench", "updated"] }
            }),
            (OperationKind::Update, Payload::Product(product)) => json!({ "product": product }),
            (OperationKind::Delete, Payload::Target(id)) => json!({ "input": { "id": id } }),
            (_, Payload::Target(id)) => json!({ "product": { "id": id } }),
            (OperationKind::Delete, Payload::Product(product)) => json!({ "input": product }),
        };
        GraphqlRequest {
            query: self.document().to_string(),
            variables,
            kind: Some(*self),
        }
    }

    /// Reads the mutation result out of the response's `data` object.
    ///
    /// Returns the remote id (if the mutation reports one), or the joined
    /// `userErrors` messages.
    pub fn interpret(&self, data: &Value) -> Result<Option<String>, String> {
        let root = data.get(self.root_field()).filter(|v| !v.is_null()).ok_or_else(|| {
            format!("Response is missing '{}'", self.root_field())
        })?;

        if let Some(errors) = root.get("userErrors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let messages: Vec<String> = errors
                    .iter()
                    .map(|e| {
                        e.get("message")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown user error")
                            .to_string()
                    })
                    .collect();
                return Err(messages.join("; "));
            }
        }

        let id = root
            .pointer("/product/id")
            .or_else(|| root.get("deletedProductId"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(id)
    }
}

/// One GraphQL operation: document, variables and the kind used to interpret it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    /// GraphQL document
    pub query: String,
    /// Variables for the document
    pub variables: Value,
    /// `None` for queries whose `data` needs no interpretation
    #[serde(skip)]
    pub kind: Option<OperationKind>,
}

impl GraphqlRequest {
    /// Cheap query used to read the bucket state before the first batch.
    pub fn calibration() -> Self {
        GraphqlRequest {
            query: SHOP_NAME.to_string(),
            variables: json!({}),
            kind: None,
        }
    }

    /// One page of existing product ids.
    pub fn product_ids(first: usize, after: Option<&str>) -> Self {
        GraphqlRequest {
            query: PRODUCT_IDS.to_string(),
            variables: json!({ "first": first, "after": after }),
            kind: None,
        }
    }
}
