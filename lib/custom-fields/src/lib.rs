//! Custom fields for the Pharma LIMS console.
//!
//! Administrators add fields to module pages (sample registration, test
//! entry, ...) and lay them out on a 20px grid. Fields may overlap; the
//! page only reports overlaps so the builder can highlight them.

pub mod draft;
pub mod error;
pub mod field;
pub mod layout;
pub mod page;
pub mod preview;

pub use draft::{FieldDraft, ModulePageDraft};
pub use error::CustomFieldError;
pub use field::{CustomField, FieldType, FieldValidation, key_from_label};
pub use layout::{GRID_SIZE, GridRect};
pub use page::{LIMS_MODULES, ModulePage};
pub use preview::{FieldPreview, PreviewControl};
