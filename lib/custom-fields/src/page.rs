//! Module pages: the forms administrators extend with custom fields.

use crate::error::CustomFieldError;
use crate::field::CustomField;
use crate::layout::{GRID_SIZE, GridRect};
use chrono::{DateTime, Utc};
use pharma_lims_core::{FieldId, ModulePageId};
use serde::{Deserialize, Serialize};

/// LIMS modules that accept custom fields.
pub const LIMS_MODULES: &[&str] = &[
    "Sample Management",
    "Test Management",
    "Inventory",
    "Equipment",
    "Stability Studies",
    "Quality Events",
    "Document Management",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulePage {
    pub id: ModulePageId,
    pub name: String,
    /// One of [`LIMS_MODULES`].
    pub module: String,
    pub description: String,
    pub fields: Vec<CustomField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ModulePage {
    #[must_use]
    pub fn new(name: impl Into<String>, module: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: ModulePageId::new(),
            name: name.into(),
            module: module.into(),
            description: String::new(),
            fields: Vec::new(),
            created_at: at,
            updated_at: at,
        }
    }

    #[must_use]
    pub fn field(&self, field_id: FieldId) -> Option<&CustomField> {
        self.fields.iter().find(|field| field.id == field_id)
    }

    /// Adds a field below the current layout, snapped to the grid.
    pub fn add_field(&mut self, mut field: CustomField) -> Result<FieldId, CustomFieldError> {
        self.ensure_key_free(&field.key, None)?;
        field.rect = GridRect {
            x: 0,
            y: self.next_free_row(),
            ..field.rect
        }
        .snapped();
        let id = field.id;
        self.fields.push(field);
        self.touch();
        Ok(id)
    }

    /// Replaces a field's definition, keeping its id and position.
    pub fn update_field(&mut self, mut field: CustomField) -> Result<(), CustomFieldError> {
        self.ensure_key_free(&field.key, Some(field.id))?;
        let existing = self.field_mut(field.id)?;
        field.rect = existing.rect;
        *existing = field;
        self.touch();
        Ok(())
    }

    pub fn move_field(&mut self, field_id: FieldId, x: u32, y: u32) -> Result<GridRect, CustomFieldError> {
        let field = self.field_mut(field_id)?;
        field.rect = GridRect { x, y, ..field.rect }.snapped();
        let rect = field.rect;
        self.touch();
        Ok(rect)
    }

    pub fn resize_field(
        &mut self,
        field_id: FieldId,
        width: u32,
        height: u32,
    ) -> Result<GridRect, CustomFieldError> {
        let field = self.field_mut(field_id)?;
        field.rect = GridRect {
            width,
            height,
            ..field.rect
        }
        .snapped();
        let rect = field.rect;
        self.touch();
        Ok(rect)
    }

    pub fn remove_field(&mut self, field_id: FieldId) -> Result<CustomField, CustomFieldError> {
        let pos = self
            .fields
            .iter()
            .position(|field| field.id == field_id)
            .ok_or(CustomFieldError::FieldNotFound { field_id })?;
        let removed = self.fields.remove(pos);
        self.touch();
        Ok(removed)
    }

    /// Pairs of fields whose boxes intersect. Overlaps are allowed; this
    /// only feeds the builder's highlight.
    #[must_use]
    pub fn overlapping_fields(&self) -> Vec<(FieldId, FieldId)> {
        let mut pairs = Vec::new();
        for (i, a) in self.fields.iter().enumerate() {
            for b in &self.fields[i + 1..] {
                if a.rect.overlaps(&b.rect) {
                    pairs.push((a.id, b.id));
                }
            }
        }
        pairs
    }

    /// The first grid row below every field, one cell of padding included.
    #[must_use]
    pub fn next_free_row(&self) -> u32 {
        self.fields
            .iter()
            .map(|field| field.rect.bottom().saturating_add(GRID_SIZE))
            .max()
            .unwrap_or(0)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn field_mut(&mut self, field_id: FieldId) -> Result<&mut CustomField, CustomFieldError> {
        self.fields
            .iter_mut()
            .find(|field| field.id == field_id)
            .ok_or(CustomFieldError::FieldNotFound { field_id })
    }

    fn ensure_key_free(&self, key: &str, except: Option<FieldId>) -> Result<(), CustomFieldError> {
        let taken = self
            .fields
            .iter()
            .any(|field| field.key == key && Some(field.id) != except);
        if taken {
            return Err(CustomFieldError::DuplicateKey {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    fn page() -> ModulePage {
        ModulePage::new("Sample Registration", "Sample Management", Utc::now())
    }

    #[test]
    fn added_fields_stack_down_the_page() {
        let mut page = page();
        let first = page.add_field(CustomField::new("Batch Number", FieldType::Text)).expect("free key");
        let second = page.add_field(CustomField::new("Expiry", FieldType::Date)).expect("free key");

        assert_eq!(page.field(first).map(|f| f.rect.y), Some(0));
        assert_eq!(page.field(second).map(|f| f.rect.y), Some(100));
        assert!(page.overlapping_fields().is_empty());
    }

    #[test]
    fn far_moves_and_resizes_stay_in_range() {
        let mut page = page();
        let id = page.add_field(CustomField::new("Batch Number", FieldType::Text)).expect("free key");

        let moved = page.move_field(id, u32::MAX, u32::MAX).expect("field exists");
        assert_eq!(moved.x, u32::MAX / GRID_SIZE * GRID_SIZE);
        let resized = page.resize_field(id, u32::MAX, u32::MAX).expect("field exists");
        assert_eq!(resized.bottom(), u32::MAX);

        let next = page.add_field(CustomField::new("Expiry", FieldType::Date)).expect("free key");
        assert_eq!(
            page.field(next).map(|f| f.rect.y),
            Some(u32::MAX / GRID_SIZE * GRID_SIZE)
        );
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut page = page();
        page.add_field(CustomField::new("Batch Number", FieldType::Text)).expect("free key");

        let err = page
            .add_field(CustomField::new("Batch number", FieldType::Barcode))
            .unwrap_err();
        assert_eq!(
            err,
            CustomFieldError::DuplicateKey {
                key: "batch_number".to_string()
            }
        );
    }

    #[test]
    fn move_and_resize_snap_to_grid() {
        let mut page = page();
        let id = page.add_field(CustomField::new("Lot", FieldType::Text)).expect("free key");

        let moved = page.move_field(id, 127, 33).expect("present");
        assert_eq!((moved.x, moved.y), (120, 40));

        let resized = page.resize_field(id, 251, 5).expect("present");
        assert_eq!((resized.width, resized.height), (260, 20));
    }

    #[test]
    fn overlapping_fields_are_allowed_and_reported() {
        let mut page = page();
        let a = page.add_field(CustomField::new("Lot", FieldType::Text)).expect("free key");
        let b = page.add_field(CustomField::new("Supplier", FieldType::Text)).expect("free key");
        page.move_field(b, 100, 20).expect("present");

        assert_eq!(page.overlapping_fields(), vec![(a, b)]);
    }

    #[test]
    fn update_keeps_position_and_remove_drops_field() {
        let mut page = page();
        let id = page.add_field(CustomField::new("Lot", FieldType::Text)).expect("free key");
        page.move_field(id, 200, 200).expect("present");

        let mut edited = page.field(id).cloned().expect("present");
        edited.required = true;
        edited.rect = GridRect::default();
        page.update_field(edited).expect("same key");

        let field = page.field(id).expect("present");
        assert!(field.required);
        assert_eq!((field.rect.x, field.rect.y), (200, 200));

        page.remove_field(id).expect("present");
        assert!(page.fields.is_empty());
        assert_eq!(
            page.remove_field(id),
            Err(CustomFieldError::FieldNotFound { field_id: id })
        );
    }
}
