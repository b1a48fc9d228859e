//! Owning registry of every field in a simulation.

use glam::DVec3;
use taxis_core::FieldId;

use crate::ChemicalField;

/// Fields indexed by [`FieldId`], in registration order.
///
/// `FieldId(n)` is the n-th inserted field. Fields are never removed.
#[derive(Clone, Debug, Default)]
pub struct FieldStore {
    fields: Vec<ChemicalField>,
}

impl FieldStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field and return its id.
    pub fn insert(&mut self, field: ChemicalField) -> FieldId {
        let id = FieldId(self.fields.len() as u32);
        self.fields.push(field);
        id
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `id` names a registered field.
    pub fn contains(&self, id: FieldId) -> bool {
        id.index() < self.fields.len()
    }

    /// Shared access to one field.
    pub fn get(&self, id: FieldId) -> Option<&ChemicalField> {
        self.fields.get(id.index())
    }

    /// Mutable access to one field.
    pub fn get_mut(&mut self, id: FieldId) -> Option<&mut ChemicalField> {
        self.fields.get_mut(id.index())
    }

    /// Id of the first field with the given name.
    pub fn id_of(&self, name: &str) -> Option<FieldId> {
        self.fields
            .iter()
            .position(|f| f.name() == name)
            .map(|i| FieldId(i as u32))
    }

    /// Look a field up by name.
    pub fn by_name(&self, name: &str) -> Option<&ChemicalField> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    /// Iterate `(id, field)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &ChemicalField)> {
        self.fields
            .iter()
            .enumerate()
            .map(|(i, f)| (FieldId(i as u32), f))
    }

    /// Iterate mutable `(id, field)` pairs in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (FieldId, &mut ChemicalField)> {
        self.fields
            .iter_mut()
            .enumerate()
            .map(|(i, f)| (FieldId(i as u32), f))
    }

    /// Deposit into field `id`. `false` if the field is unknown or the
    /// position lies outside its grid.
    pub fn add_quantity(&mut self, id: FieldId, position: DVec3, amount: f64) -> bool {
        self.get_mut(id)
            .is_some_and(|f| f.add_quantity(position, amount))
    }

    /// Concentration of field `id` at `position`, if both exist.
    pub fn conc_at(&self, id: FieldId, position: DVec3) -> Option<f64> {
        self.get(id).and_then(|f| f.conc_at(position))
    }
}
