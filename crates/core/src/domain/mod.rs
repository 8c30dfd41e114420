pub mod product;
pub mod usage;
