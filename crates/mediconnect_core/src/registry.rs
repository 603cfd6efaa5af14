//! In-memory entity registries
//!
//! A [`Registry`] is an ordered collection behind an `Arc`. Readers take
//! snapshots; writers go through `append`, `update_where` or `retain`, which
//! copy the collection first if any snapshot is still alive. A snapshot never
//! changes after it is taken.

use std::sync::Arc;

use crate::id::{AppointmentId, DoctorId, Id, IdType, PatientId, PrescriptionId, ReviewId};
use crate::profile::{AdminProfile, Credentialed, DoctorProfile, PatientProfile};
use crate::{appointment::Appointment, prescription::Prescription, review::Review};

/// Records that can be looked up by ID
pub trait Keyed {
    type Marker: IdType;

    fn key(&self) -> &Id<Self::Marker>;
}

#[derive(Debug)]
pub struct Registry<T> {
    entries: Arc<Vec<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Vec::new()),
        }
    }
}

impl<T: Clone> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T: Clone> Registry<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    /// An immutable view of the collection as it is now
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.entries)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.entries.iter().find(|entry| predicate(entry))
    }

    pub fn any(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.entries.iter().any(predicate)
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.entries
            .iter()
            .filter(|entry| predicate(entry))
            .cloned()
            .collect()
    }

    pub fn append(&mut self, entry: T) {
        Arc::make_mut(&mut self.entries).push(entry);
    }

    /// Apply `update` to every entry matching `predicate`, returning how many changed
    pub fn update_where(
        &mut self,
        predicate: impl Fn(&T) -> bool,
        mut update: impl FnMut(&mut T),
    ) -> usize {
        if !self.entries.iter().any(&predicate) {
            return 0;
        }

        let mut touched = 0;
        for entry in Arc::make_mut(&mut self.entries).iter_mut() {
            if predicate(entry) {
                update(entry);
                touched += 1;
            }
        }
        touched
    }

    /// Keep only entries matching `predicate`, returning how many were dropped
    pub fn retain(&mut self, predicate: impl Fn(&T) -> bool) -> usize {
        if self.entries.iter().all(&predicate) {
            return 0;
        }

        let entries = Arc::make_mut(&mut self.entries);
        let before = entries.len();
        entries.retain(|entry| predicate(entry));
        before - entries.len()
    }
}

impl<T: Clone + Keyed> Registry<T> {
    pub fn get(&self, id: &Id<T::Marker>) -> Option<&T> {
        self.find(|entry| entry.key() == id)
    }

    /// Update the entry with this ID, returning its new value
    pub fn update(&mut self, id: &Id<T::Marker>, update: impl FnOnce(&mut T)) -> Option<T> {
        let mut update = Some(update);
        let touched = self.update_where(
            |entry| entry.key() == id,
            |entry| {
                if let Some(f) = update.take() {
                    f(entry);
                }
            },
        );
        if touched == 0 {
            return None;
        }
        self.get(id).cloned()
    }

    pub fn remove(&mut self, id: &Id<T::Marker>) -> Option<T> {
        let removed = self.get(id).cloned()?;
        self.retain(|entry| entry.key() != id);
        Some(removed)
    }
}

impl Keyed for Credentialed<PatientProfile> {
    type Marker = crate::id::PatientIdType;

    fn key(&self) -> &PatientId {
        &self.profile.id
    }
}

impl Keyed for Credentialed<DoctorProfile> {
    type Marker = crate::id::DoctorIdType;

    fn key(&self) -> &DoctorId {
        &self.profile.id
    }
}

impl Keyed for Credentialed<AdminProfile> {
    type Marker = crate::id::AdminIdType;

    fn key(&self) -> &crate::id::AdminId {
        &self.profile.id
    }
}

impl Keyed for Appointment {
    type Marker = crate::id::AppointmentIdType;

    fn key(&self) -> &AppointmentId {
        &self.id
    }
}

impl Keyed for Prescription {
    type Marker = crate::id::PrescriptionIdType;

    fn key(&self) -> &PrescriptionId {
        &self.id
    }
}

impl Keyed for Review {
    type Marker = crate::id::ReviewIdType;

    fn key(&self) -> &ReviewId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_id_type;

    define_id_type!(WidgetIdType, "w");

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: Id<WidgetIdType>,
        size: u32,
    }

    impl Keyed for Widget {
        type Marker = WidgetIdType;

        fn key(&self) -> &Id<WidgetIdType> {
            &self.id
        }
    }

    fn widget(key: &'static str, size: u32) -> Widget {
        Widget {
            id: Id::from_static(key),
            size,
        }
    }

    #[test]
    fn snapshots_are_immutable() {
        let mut registry = Registry::new(vec![widget("w1", 1), widget("w2", 2)]);
        let before = registry.snapshot();

        registry.append(widget("w3", 3));
        registry.update(&Id::from_static("w1"), |w| w.size = 10);
        registry.remove(&Id::from_static("w2"));

        assert_eq!(*before, vec![widget("w1", 1), widget("w2", 2)]);
        assert_eq!(
            *registry.snapshot(),
            vec![widget("w1", 10), widget("w3", 3)]
        );
    }

    #[test]
    fn update_missing_id_is_a_noop() {
        let mut registry = Registry::new(vec![widget("w1", 1)]);
        let before = registry.snapshot();

        assert!(registry.update(&Id::from_static("nope"), |w| w.size = 0).is_none());
        // no copy was made
        assert!(Arc::ptr_eq(&before, &registry.snapshot()));
    }

    #[test]
    fn update_where_counts_matches() {
        let mut registry = Registry::new(vec![widget("w1", 1), widget("w2", 2), widget("w3", 3)]);
        let touched = registry.update_where(|w| w.size >= 2, |w| w.size *= 100);

        assert_eq!(touched, 2);
        assert_eq!(registry.get(&Id::from_static("w3")).unwrap().size, 300);
        assert_eq!(registry.get(&Id::from_static("w1")).unwrap().size, 1);
    }

    #[test]
    fn retain_reports_removed() {
        let mut registry = Registry::new(vec![widget("w1", 1), widget("w2", 2)]);
        assert_eq!(registry.retain(|w| w.size > 1), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.retain(|_| true), 0);
    }
}
