//! Folders: named, order-preserving phrase containers
//!
//! A [`FolderSet`] is the mapping for one scope, either owned by a list
//! (local) or by the workspace (global).

use crate::models::Phrase;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FolderError {
    #[error("Folder already exists: {0}")]
    NameCollision(String),

    #[error("Folder not found: {0}")]
    NotFound(String),

    #[error("Folder name must not be empty")]
    EmptyName,

    #[error("Phrase text must not be empty")]
    EmptyPhrase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub name: String,
    pub phrases: Vec<Phrase>,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phrases: Vec::new(),
        }
    }

    /// Append unless the exact (text, frequency) pair is already present.
    /// Returns whether the folder changed.
    pub fn add_phrase(&mut self, text: &str, frequency: u64) -> bool {
        if self
            .phrases
            .iter()
            .any(|p| p.text == text && p.frequency == frequency)
        {
            return false;
        }
        self.phrases.push(Phrase::new(text, frequency));
        true
    }

    /// Remove every entry with this exact text, whatever its frequency
    pub fn remove_phrase(&mut self, text: &str) -> usize {
        let before = self.phrases.len();
        self.phrases.retain(|p| p.text != text);
        before - self.phrases.len()
    }

    pub fn clear(&mut self) {
        self.phrases.clear();
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Folders of one scope, in creation order. Names are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSet {
    folders: Vec<Folder>,
}

impl FolderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, name: &str) -> Result<&mut Folder, FolderError> {
        if name.trim().is_empty() {
            return Err(FolderError::EmptyName);
        }
        if self.contains(name) {
            return Err(FolderError::NameCollision(name.to_string()));
        }
        self.folders.push(Folder::new(name));
        let last = self.folders.len() - 1;
        Ok(&mut self.folders[last])
    }

    pub fn delete(&mut self, name: &str) -> Result<Folder, FolderError> {
        let index = self
            .folders
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| FolderError::NotFound(name.to_string()))?;
        Ok(self.folders.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.name == name)
    }

    pub fn require(&self, name: &str) -> Result<&Folder, FolderError> {
        self.get(name)
            .ok_or_else(|| FolderError::NotFound(name.to_string()))
    }

    pub fn require_mut(&mut self, name: &str) -> Result<&mut Folder, FolderError> {
        self.get_mut(name)
            .ok_or_else(|| FolderError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Folder> {
        self.folders.iter()
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_phrase_is_idempotent_per_tuple() {
        let mut folder = Folder::new("brands");
        assert!(folder.add_phrase("nike shoes", 10));
        assert!(!folder.add_phrase("nike shoes", 10));
        assert!(folder.add_phrase("nike shoes", 11));
        assert_eq!(folder.len(), 2);
    }

    #[test]
    fn test_remove_phrase_ignores_frequency() {
        let mut folder = Folder::new("brands");
        folder.add_phrase("nike", 1);
        folder.add_phrase("nike", 2);
        folder.add_phrase("adidas", 3);
        assert_eq!(folder.remove_phrase("nike"), 2);
        assert_eq!(folder.phrases, vec![Phrase::new("adidas", 3)]);
    }

    #[test]
    fn test_create_rejects_collision_case_sensitively() {
        let mut set = FolderSet::new();
        set.create("Brands").unwrap();
        assert_eq!(
            set.create("Brands").unwrap_err(),
            FolderError::NameCollision("Brands".to_string())
        );
        assert!(set.create("brands").is_ok());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_clear_keeps_folder() {
        let mut set = FolderSet::new();
        set.create("tmp").unwrap().add_phrase("x", 0);
        set.require_mut("tmp").unwrap().clear();
        assert!(set.require("tmp").unwrap().is_empty());
        assert!(set.delete("tmp").is_ok());
        assert_eq!(set.delete("tmp").unwrap_err(), FolderError::NotFound("tmp".into()));
    }
}
