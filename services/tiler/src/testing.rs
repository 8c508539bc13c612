//! Test doubles shared across service module tests.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use grid_pipeline::ScalarField;
use tiles_common::{FieldFilter, Primitive};

use crate::decode::{DecodeError, FieldDecoder};

/// An in-memory decoder: serves configured fields, reports everything else
/// as `VariableNotFound`, and counts calls so tests can assert that cached
/// work never reaches the decoder.
pub struct FakeDecoder {
    fields: HashMap<Primitive, ScalarField>,
    failing: HashSet<Primitive>,
    calls: AtomicUsize,
}

impl FakeDecoder {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
            failing: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_field(mut self, primitive: Primitive, field: ScalarField) -> Self {
        self.fields.insert(primitive, field);
        self
    }

    /// Make decoding this primitive fail with a read error.
    pub fn failing(mut self, primitive: Primitive) -> Self {
        self.failing.insert(primitive);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FieldDecoder for FakeDecoder {
    fn decode(
        &self,
        _path: &Path,
        filter: &FieldFilter,
        scratch_index: &Path,
    ) -> Result<ScalarField, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Scratch writes are best-effort, like the real decoder's.
        let _ = std::fs::write(scratch_index, b"{}");

        let primitive = Primitive::ALL
            .iter()
            .find(|p| p.filter() == *filter)
            .ok_or(DecodeError::VariableNotFound)?;

        if self.failing.contains(primitive) {
            return Err(DecodeError::Read("synthetic decode failure".to_string()));
        }

        self.fields
            .get(primitive)
            .cloned()
            .ok_or(DecodeError::VariableNotFound)
    }
}
