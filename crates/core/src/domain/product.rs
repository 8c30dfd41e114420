use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only projection of a catalog row, used for search results.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub price_per_sqft: Option<String>,
    pub price_per_box: Option<String>,
    pub size_primary: Option<String>,
    pub color: Option<String>,
    pub finish: Option<String>,
    pub store_id: Option<i64>,
    pub last_scraped_at: Option<String>,
}

impl ProductSummary {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: ProductId::new(id), ..Self::default() }
    }
}

/// One scraped label/value pair. Keys are free text and may repeat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub key: String,
    pub value: String,
}

impl AttributeRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDocument {
    pub label: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedItem {
    pub name: String,
    pub url: String,
    pub related_id: Option<ProductId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: ProductSummary,
    pub attributes: Vec<AttributeRecord>,
    pub documents: Vec<ProductDocument>,
    pub related_items: Vec<RelatedItem>,
}

impl ProductDetail {
    pub fn new(product: ProductSummary) -> Self {
        Self { product, attributes: Vec::new(), documents: Vec::new(), related_items: Vec::new() }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(AttributeRecord::new(key, value));
        self
    }

    pub fn id(&self) -> &ProductId {
        &self.product.id
    }
}
