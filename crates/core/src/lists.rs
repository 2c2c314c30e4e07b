//! Ordered, client-identified lists embedded in sections.
//!
//! Every operation returns a new list rather than editing in place, so a section holding the
//! list is replaced as a whole on each change. Order is insertion order; operations addressing
//! an id that is not in the list return an unchanged copy.

use crate::merge::{patch_value, FieldPatch};
use crate::CoreResult;
use clinica_uuid::EntityId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// An entity that lives in an [`EntityList`].
pub trait ListEntity: Clone {
    /// Prefix for display labels ("Cuidador 1", "Exame 2", ...).
    const LABEL: &'static str;

    fn id(&self) -> &EntityId;

    fn id_mut(&mut self) -> &mut EntityId;
}

/// Display label for the entity at `index` (0-based) of a list of `T`.
///
/// Labels are derived from the current position and are never stored.
pub fn display_label<T: ListEntity>(index: usize) -> String {
    format!("{} {}", T::LABEL, index + 1)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityList<T>(Vec<T>);

impl<T> Default for EntityList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> From<Vec<T>> for EntityList<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T: ListEntity> EntityList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.0.iter().find(|item| item.id() == id)
    }

    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.0.iter().position(|item| item.id() == id)
    }

    /// Label of the entity with `id`, based on its current position.
    pub fn label_of(&self, id: &EntityId) -> Option<String> {
        self.position(id).map(display_label::<T>)
    }

    /// Appends a default entity (which carries a freshly minted id).
    pub fn with_added(&self) -> (Self, EntityId)
    where
        T: Default,
    {
        let entity = T::default();
        let id = entity.id().clone();
        (self.with_entity(entity), id)
    }

    /// Appends `entity` as is.
    pub fn with_entity(&self, entity: T) -> Self {
        let mut items = self.0.clone();
        items.push(entity);
        Self(items)
    }

    /// Applies `edit` to the entity with `id`. Other entities and the order are untouched.
    pub fn with_updated(&self, id: &EntityId, edit: impl FnOnce(&mut T)) -> Self {
        let mut items = self.0.clone();
        match items.iter_mut().find(|item| item.id() == id) {
            Some(item) => edit(item),
            None => tracing::debug!("update ignored, {} {} not in list", T::LABEL, id),
        }
        Self(items)
    }

    /// Drops the entity with `id`, preserving the order of the rest.
    pub fn without(&self, id: &EntityId) -> Self {
        Self(
            self.0
                .iter()
                .filter(|item| item.id() != id)
                .cloned()
                .collect(),
        )
    }

    /// `(id, label)` pairs in display order.
    pub fn labels(&self) -> Vec<(EntityId, String)> {
        self.0
            .iter()
            .enumerate()
            .map(|(index, item)| (item.id().clone(), display_label::<T>(index)))
            .collect()
    }
}

impl<T> EntityList<T>
where
    T: ListEntity + Serialize + DeserializeOwned,
{
    /// Writes `patch` (a path relative to the entity) on the entity with `id`.
    ///
    /// An absent id returns an unchanged copy.
    pub fn with_field(&self, id: &EntityId, patch: &FieldPatch) -> CoreResult<Self> {
        let Some(position) = self.position(id) else {
            tracing::debug!("field write ignored, {} {} not in list", T::LABEL, id);
            return Ok(self.clone());
        };
        let mut items = self.0.clone();
        if let Some(next) = patch_value(&items[position], patch, &display_label::<T>(position))? {
            items[position] = next;
        }
        Ok(Self(items))
    }
}

impl<'a, T> IntoIterator for &'a EntityList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
