//! Local preview URLs for images attached to a combination before upload.
//!
//! A preview is a scoped resource: acquired when a file is attached, released
//! once no combination references the file any more, and released in bulk when
//! the owning store is torn down.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use crate::domain::aggregates::{Combination, CombinationKey};

/// Pending-upload file handle
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageFile {
    pub id: Uuid,
    pub name: String,
    pub size_bytes: u64,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self { id: Uuid::new_v4(), name: name.into(), size_bytes }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    pub fn new(url: impl Into<String>) -> Self { Self(url.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

/// Platform hook that creates and revokes preview URLs.
pub trait PreviewAllocator: Send {
    fn acquire(&mut self, file: &ImageFile) -> PreviewUrl;
    fn release(&mut self, url: &PreviewUrl);
}

/// Allocator backed by a shared set of live URLs.
///
/// Clones share the set, so a caller can keep one handle and watch the count
/// while the store owns the other.
#[derive(Clone, Debug, Default)]
pub struct InMemoryPreviews {
    live: Arc<Mutex<HashSet<String>>>,
}

impl InMemoryPreviews {
    pub fn new() -> Self { Self::default() }

    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or_default()
    }

    pub fn is_live(&self, url: &PreviewUrl) -> bool {
        self.live.lock().map(|live| live.contains(url.as_str())).unwrap_or_default()
    }
}

impl PreviewAllocator for InMemoryPreviews {
    fn acquire(&mut self, file: &ImageFile) -> PreviewUrl {
        let url = format!("blob:preview/{}", Uuid::new_v4());
        if let Ok(mut live) = self.live.lock() { live.insert(url.clone()); }
        tracing::trace!(file = %file.name, %url, "preview acquired");
        PreviewUrl(url)
    }

    fn release(&mut self, url: &PreviewUrl) {
        if let Ok(mut live) = self.live.lock() { live.remove(url.as_str()); }
        tracing::trace!(url = %url.as_str(), "preview released");
    }
}

/// Ownership map from file id to its preview and the combination holding it.
pub struct PreviewLedger {
    allocator: Box<dyn PreviewAllocator>,
    owned: HashMap<Uuid, (PreviewUrl, CombinationKey)>,
}

impl PreviewLedger {
    pub fn new(allocator: Box<dyn PreviewAllocator>) -> Self {
        Self { allocator, owned: HashMap::new() }
    }

    pub fn preview_url(&self, file_id: &Uuid) -> Option<&PreviewUrl> {
        self.owned.get(file_id).map(|(url, _)| url)
    }

    pub fn owner(&self, file_id: &Uuid) -> Option<&CombinationKey> {
        self.owned.get(file_id).map(|(_, key)| key)
    }

    /// Brings the ledger in line with `records`: new files get a preview, files
    /// still referenced move to their current owner, the rest are released.
    pub fn sync(&mut self, records: &[Combination]) {
        let mut referenced: HashSet<Uuid> = HashSet::new();
        for record in records {
            let key = record.key();
            for file in &record.image_files {
                referenced.insert(file.id);
                match self.owned.get_mut(&file.id) {
                    Some((_, owner)) => *owner = key.clone(),
                    None => {
                        let url = self.allocator.acquire(file);
                        self.owned.insert(file.id, (url, key.clone()));
                    }
                }
            }
        }
        let stale: Vec<Uuid> = self.owned.keys().filter(|id| !referenced.contains(id)).copied().collect();
        for id in stale {
            if let Some((url, _)) = self.owned.remove(&id) { self.allocator.release(&url); }
        }
    }

    pub fn release_all(&mut self) {
        for (_, (url, _)) in self.owned.drain() { self.allocator.release(&url); }
    }
}

impl Drop for PreviewLedger {
    fn drop(&mut self) { self.release_all(); }
}

impl std::fmt::Debug for PreviewLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewLedger").field("owned", &self.owned.len()).finish()
    }
}
