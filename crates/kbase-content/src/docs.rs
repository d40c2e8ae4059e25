//! Doc service.
//!
//! A doc is stored only together with its converted rendering: uploads and
//! file replacements convert first and write afterwards, so a failed
//! conversion leaves the store untouched.

use std::sync::Arc;
use std::time::Instant;

use kbase_core::{
    ConversionBackend, Doc, DocFile, DocSummary, Error, OwnerKey, Result, ScopedEntity,
    ScopedStore, TopicId,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::directory::OwnerDirectory;
use crate::validation::validate_doc_name;

/// Manages docs under owner key `O`.
pub struct DocService<O: OwnerKey> {
    docs: Arc<dyn ScopedStore<Doc<O>>>,
    converter: Arc<dyn ConversionBackend>,
    owners: Arc<dyn OwnerDirectory<O>>,
}

impl<O: OwnerKey> Clone for DocService<O> {
    fn clone(&self) -> Self {
        Self {
            docs: Arc::clone(&self.docs),
            converter: Arc::clone(&self.converter),
            owners: Arc::clone(&self.owners),
        }
    }
}

impl<O: OwnerKey> DocService<O> {
    pub fn new(
        docs: Arc<dyn ScopedStore<Doc<O>>>,
        converter: Arc<dyn ConversionBackend>,
        owners: Arc<dyn OwnerDirectory<O>>,
    ) -> Self {
        Self {
            docs,
            converter,
            owners,
        }
    }

    async fn convert(&self, primary: &[u8]) -> Result<Vec<u8>> {
        if primary.is_empty() {
            return Err(Error::ConversionFailed(
                "Reading bytes from DOCX upload not possible: file is empty".to_string(),
            ));
        }
        let start = Instant::now();
        let derived = self.converter.convert(primary).await.inspect_err(|e| {
            warn!(
                subsystem = "content",
                component = "docs",
                op = "convert",
                backend = self.converter.name(),
                error = %e,
                "Document conversion failed"
            );
        })?;
        if derived.is_empty() {
            return Err(Error::ConversionFailed(
                "converter returned an empty document".to_string(),
            ));
        }
        info!(
            subsystem = "content",
            component = "docs",
            op = "convert",
            backend = self.converter.name(),
            byte_len = primary.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Document converted"
        );
        Ok(derived)
    }

    /// Load a doc, apply `update`, and save it back under the same id.
    async fn modify<F>(&self, id: Uuid, owner: &O, update: F) -> Result<Doc<O>>
    where
        F: FnOnce(&mut Doc<O>) + Send,
    {
        let mut doc = self
            .docs
            .find_by_id_and_owner(id, owner)
            .await?
            .ok_or(Error::DocNotFound(id))?;
        update(&mut doc);
        self.docs.save(doc).await
    }

    pub async fn add_doc(&self, owner: &O, name: &str, primary: Vec<u8>) -> Result<DocSummary<O>> {
        validate_doc_name(name)?;
        self.owners.ensure_exists(owner).await?;
        if self.docs.exists_by_owner_and_name(owner, name).await? {
            return Err(Error::DocNameAlreadyTaken(name.to_string()));
        }

        let derived = self.convert(&primary).await?;
        let doc = self
            .docs
            .save(Doc::new(owner.clone(), name, primary, derived))
            .await?;
        let summary = doc.summary()?;

        info!(
            subsystem = "content",
            component = "docs",
            op = "add",
            doc_id = %summary.id,
            owner = %owner,
            "Doc created"
        );
        Ok(summary)
    }

    pub async fn list_docs(&self, owner: &O) -> Result<Vec<DocSummary<O>>> {
        self.owners.ensure_exists(owner).await?;
        self.docs.find_all_by_owner_projected(owner).await
    }

    async fn file(&self, id: Uuid, owner: &O, field: DocFile) -> Result<Vec<u8>> {
        self.docs
            .find_binary_field_by_id_and_owner(id, owner, field)
            .await?
            .ok_or(Error::DocNotFound(id))
    }

    /// The uploaded DOCX.
    pub async fn get_primary_file(&self, id: Uuid, owner: &O) -> Result<Vec<u8>> {
        self.file(id, owner, DocFile::Primary).await
    }

    /// The converted rendering (PDF).
    pub async fn get_derived_file(&self, id: Uuid, owner: &O) -> Result<Vec<u8>> {
        self.file(id, owner, DocFile::Derived).await
    }

    /// Rename a doc, keeping both files. A name already used by any doc of
    /// the same owner is rejected, including the doc's own current name.
    pub async fn rename_doc(&self, id: Uuid, owner: &O, name: &str) -> Result<DocSummary<O>> {
        validate_doc_name(name)?;
        if !self.docs.exists_by_id_and_owner(id, owner).await? {
            return Err(Error::DocNotFound(id));
        }
        if self.docs.exists_by_owner_and_name(owner, name).await? {
            return Err(Error::DocNameAlreadyTaken(name.to_string()));
        }

        let new_name = name.to_string();
        let doc = self.modify(id, owner, |doc| doc.name = new_name).await?;
        info!(
            subsystem = "content",
            component = "docs",
            op = "rename",
            doc_id = %id,
            "Doc renamed"
        );
        doc.summary()
    }

    /// Replace the uploaded file and its rendering; id, owner and name stay.
    pub async fn replace_file(&self, id: Uuid, owner: &O, primary: Vec<u8>) -> Result<DocSummary<O>> {
        if !self.docs.exists_by_id_and_owner(id, owner).await? {
            return Err(Error::DocNotFound(id));
        }

        let derived = self.convert(&primary).await?;
        let doc = self
            .modify(id, owner, |doc| {
                doc.primary_file = primary;
                doc.derived_file = derived;
            })
            .await?;
        info!(
            subsystem = "content",
            component = "docs",
            op = "replace_file",
            doc_id = %id,
            "Doc file replaced"
        );
        doc.summary()
    }

    pub async fn delete_doc(&self, id: Uuid, owner: &O) -> Result<()> {
        if !self.docs.exists_by_id_and_owner(id, owner).await? {
            return Err(Error::DocNotFound(id));
        }
        self.docs.delete_by_id_and_owner(id, owner).await?;
        info!(
            subsystem = "content",
            component = "docs",
            op = "delete",
            doc_id = %id,
            "Doc deleted"
        );
        Ok(())
    }

    /// Delete every doc under `owner`. Succeeds when there is nothing to delete.
    pub async fn delete_docs_by_owner(&self, owner: &O) -> Result<u64> {
        let removed = self.docs.delete_all_by_owner(owner).await?;
        info!(
            subsystem = "content",
            component = "docs",
            op = "delete_by_owner",
            owner = %owner,
            result_count = removed,
            "Docs deleted by owner"
        );
        Ok(removed)
    }
}

impl DocService<TopicId> {
    /// Delete every doc of a topic; fails if the topic does not exist.
    pub async fn delete_docs_by_topic(&self, topic_id: &TopicId) -> Result<u64> {
        self.owners.ensure_exists(topic_id).await?;
        self.delete_docs_by_owner(topic_id).await
    }
}
