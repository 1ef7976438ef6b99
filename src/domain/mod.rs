//! Domain types and models

pub mod catalog;
pub mod design;
pub mod placement;
pub mod product;

pub use catalog::{BlueprintInfo, Placeholder, ProductCatalog, ProductTemplate, ProductType, Variant};
pub use design::DesignAsset;
pub use placement::{FitMode, ProductProfile};
pub use product::{DraftVariant, PrintArea, PrintAreaPatch, ProductDraft, ProviderProduct, UploadHandle};
