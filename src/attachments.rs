//! Claim attachments and their previews
//!
//! Photos and documents picked during intake get a transient preview URL from
//! a [`PreviewService`]. The URL is revoked exactly once: when the attachment
//! is removed or when the owning [`AttachmentList`] is dropped.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AttachmentError;

/// Metadata of a file the user attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub size: u64,
}

impl Attachment {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Issues and reclaims transient preview URLs
pub trait PreviewService: Send + Sync {
    fn create(&self, attachment: &Attachment) -> String;
    fn revoke(&self, url: &str);
}

/// Preview URL that is revoked when dropped
pub struct PreviewHandle {
    url: String,
    service: Arc<dyn PreviewService>,
}

impl PreviewHandle {
    fn new(service: Arc<dyn PreviewService>, attachment: &Attachment) -> Self {
        let url = service.create(attachment);
        Self { url, service }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        tracing::debug!(target: "claimdesk::attachments", url = %self.url, "Revoking preview");
        self.service.revoke(&self.url);
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle").field("url", &self.url).finish()
    }
}

/// Attachments of one wizard session, each with its live preview
pub struct AttachmentList {
    service: Arc<dyn PreviewService>,
    entries: Vec<(Attachment, PreviewHandle)>,
    max_files: usize,
    max_size: u64,
}

impl AttachmentList {
    /// Defaults: 10 files of up to 10 MiB each
    pub fn new(service: Arc<dyn PreviewService>) -> Self {
        Self {
            service,
            entries: Vec::new(),
            max_files: 10,
            max_size: 10 * 1024 * 1024,
        }
    }

    pub fn with_limits(mut self, max_files: usize, max_size: u64) -> Self {
        self.max_files = max_files;
        self.max_size = max_size;
        self
    }

    /// Attach a file and create its preview
    pub fn add(&mut self, attachment: Attachment) -> Result<&str, AttachmentError> {
        if self.entries.len() >= self.max_files {
            return Err(AttachmentError::TooMany(self.max_files));
        }
        if attachment.size > self.max_size {
            return Err(AttachmentError::TooLarge {
                name: attachment.name,
                limit: self.max_size,
            });
        }
        if self.entries.iter().any(|(a, _)| a.name == attachment.name) {
            return Err(AttachmentError::Duplicate(attachment.name));
        }

        let handle = PreviewHandle::new(Arc::clone(&self.service), &attachment);
        self.entries.push((attachment, handle));
        Ok(self.entries[self.entries.len() - 1].1.url())
    }

    /// Remove an attachment by name, revoking its preview
    pub fn remove(&mut self, name: &str) -> Option<Attachment> {
        let position = self.entries.iter().position(|(a, _)| a.name == name)?;
        let (attachment, handle) = self.entries.remove(position);
        drop(handle);
        Some(attachment)
    }

    /// Preview URL of an attachment
    pub fn preview_url(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(a, _)| a.name == name)
            .map(|(_, handle)| handle.url())
    }

    /// Metadata of every attachment, in the order they were added
    pub fn manifest(&self) -> Vec<Attachment> {
        self.entries.iter().map(|(a, _)| a.clone()).collect()
    }

    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|(a, _)| a.size).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
