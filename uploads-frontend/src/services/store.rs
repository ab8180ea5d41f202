use crate::models::{UpdateUploadRequest, UploadedFileRecord};
use dashmap::{DashMap, DashSet};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// In-memory state behind the uploads panel.
#[derive(Debug, Default)]
pub struct UploadStore {
    records: DashMap<String, Entry>,
    busy: DashSet<String>,
    in_flight: AtomicUsize,
    sequence: AtomicU64,
}

#[derive(Debug)]
struct Entry {
    seq: u64,
    record: UploadedFileRecord,
}

impl UploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: UploadedFileRecord) {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.records.insert(record.id.clone(), Entry { seq, record });
    }

    /// All records, newest first.
    pub fn list(&self) -> Vec<UploadedFileRecord> {
        let mut entries: Vec<(u64, UploadedFileRecord)> = self
            .records
            .iter()
            .map(|entry| (entry.seq, entry.record.clone()))
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        entries.into_iter().map(|(_, record)| record).collect()
    }

    pub fn get(&self, id: &str) -> Option<UploadedFileRecord> {
        self.records.get(id).map(|entry| entry.record.clone())
    }

    pub fn remove(&self, id: &str) -> Option<UploadedFileRecord> {
        self.records.remove(id).map(|(_, entry)| entry.record)
    }

    pub fn update(&self, id: &str, update: UpdateUploadRequest) -> Option<UploadedFileRecord> {
        let mut entry = self.records.get_mut(id)?;
        update.apply(&mut entry.record);
        Some(entry.record.clone())
    }

    pub fn set_error(&self, id: &str, message: &str) {
        if let Some(mut entry) = self.records.get_mut(id) {
            entry.record.error = Some(message.to_string());
        }
    }

    /// Mark `id` busy until the guard drops. `None` when it is already busy.
    pub fn mark_busy(&self, id: &str) -> Option<BusyGuard<'_>> {
        if !self.busy.insert(id.to_string()) {
            return None;
        }
        Some(BusyGuard {
            store: self,
            id: id.to_string(),
        })
    }

    pub fn busy_ids(&self) -> HashSet<String> {
        self.busy.iter().map(|id| id.key().clone()).collect()
    }

    /// Count an upload batch as in flight until the guard drops.
    pub fn begin_upload(&self) -> UploadInFlight<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        UploadInFlight { store: self }
    }

    pub fn is_uploading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

pub struct BusyGuard<'a> {
    store: &'a UploadStore,
    id: String,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.store.busy.remove(&self.id);
    }
}

pub struct UploadInFlight<'a> {
    store: &'a UploadStore,
}

impl Drop for UploadInFlight<'_> {
    fn drop(&mut self) {
        self.store.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
