pub mod config;
pub mod domain;
pub mod errors;
pub mod suitability;

pub use domain::product::{
    AttributeRecord, ProductDetail, ProductDocument, ProductId, ProductSummary, RelatedItem,
};
pub use domain::usage::{UsageVerdict, UseCase};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use suitability::evaluate;
