use std::collections::HashMap;

/// Folder listings seen during one session. Listing a folder takes a few
/// moments, so each folder is queried once.
#[derive(Debug, Default)]
pub struct FolderCache {
    listings: HashMap<String, Vec<String>>,
}

impl FolderCache {
    pub fn new() -> Self {
        FolderCache::default()
    }

    pub fn get(&self, folder: &str) -> Option<&[String]> {
        self.listings.get(folder).map(Vec::as_slice)
    }

    pub fn contains(&self, folder: &str) -> bool {
        self.listings.contains_key(folder)
    }

    pub fn insert(&mut self, folder: &str, listing: Vec<String>) {
        self.listings.insert(folder.to_string(), listing);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.listings.len()
    }
}

// -- Tests -------------------------------------------------------------------
