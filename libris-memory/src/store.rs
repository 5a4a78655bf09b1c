//! In-memory storage implementation for document stores.
//!
//! Documents are held as BSON values in HashMaps behind an async-aware
//! read-write lock. Each backend call takes the lock exactly once.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document as BsonDocument, Uuid};

use libris_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Query, Sort, SortDirection},
};

use crate::evaluator::{Comparable, DocumentEvaluator};

type CollectionMap = HashMap<String, Bson>;
type StoreMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so
/// clones share the same underlying data.
///
/// Queries scan every document in a collection; there are no indexes.
///
/// # Example
///
/// ```ignore
/// use libris_memory::InMemoryStore;
/// use libris_core::backend::StoreBackend;
/// use bson::{Uuid, Bson, doc};
///
/// let store = InMemoryStore::new();
///
/// let id = Uuid::new();
/// let doc = Bson::Document(doc! { "name": "Poetry" });
/// store.insert_documents(vec![(id, doc)], "genres").await?;
///
/// let docs = store.get_documents(vec![id], "genres").await?;
/// assert_eq!(docs.len(), 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> (document_id -> document)
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self { store: Arc::new(RwLock::new(StoreMap::new())) }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }
}

fn sort_key<'a>(document: &'a Bson, field: &str) -> Comparable<'a> {
    document
        .as_document()
        .and_then(|doc| doc.get(field))
        .map(Comparable::from)
        .unwrap_or(Comparable::Null)
}

fn sort_documents(documents: &mut [Bson], sort: &Sort) {
    documents.sort_by(|a, b| {
        let left = sort_key(a, &sort.field);
        let right = sort_key(b, &sort.field);

        match sort.direction {
            SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
            SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
        }
    });
}

/// Keeps only the named top-level fields of a document.
fn project(document: Bson, fields: &[String]) -> Bson {
    match document {
        Bson::Document(doc) => Bson::Document(
            doc.into_iter()
                .filter(|(key, _)| fields.iter().any(|field| field == key))
                .collect::<BsonDocument>(),
        ),
        other => other,
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_documents(&self, documents: Vec<(Uuid, Bson)>, collection: &str) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.to_string())
            .or_default();

        for (id, doc) in documents {
            let key = id.to_string();

            if collection_map.contains_key(&key) {
                return Err(DocumentStoreError::DocumentAlreadyExists(key, collection.to_string()));
            }

            collection_map.insert(key, doc);
        }

        Ok(())
    }

    async fn update_documents(
        &self,
        updates: Vec<(Uuid, BsonDocument)>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>> {
        let mut store = self.store.write().await;
        let collection_map = store.get_mut(collection);

        let Some(collection_map) = collection_map else {
            // Nothing can be updated in a collection that was never written to.
            return match updates.first() {
                Some((id, _)) => Err(DocumentStoreError::DocumentNotFound(id.to_string(), collection.to_string())),
                None => Ok(vec![]),
            };
        };

        // Check every id before touching anything so a failed batch leaves no trace.
        for (id, _) in &updates {
            let key = id.to_string();

            if !collection_map.contains_key(&key) {
                return Err(DocumentStoreError::DocumentNotFound(key, collection.to_string()));
            }
        }

        let mut updated = Vec::with_capacity(updates.len());

        for (id, fields) in updates {
            let key = id.to_string();

            match collection_map.get_mut(&key) {
                Some(Bson::Document(existing)) => {
                    for (field, value) in fields {
                        existing.insert(field, value);
                    }

                    updated.push(Bson::Document(existing.clone()));
                }
                Some(_) => {
                    return Err(DocumentStoreError::InvalidDocument(format!(
                        "{key} in collection {collection} is not a document"
                    )));
                }
                None => return Err(DocumentStoreError::DocumentNotFound(key, collection.to_string())),
            }
        }

        Ok(updated)
    }

    async fn delete_documents(&self, ids: Vec<Uuid>, collection: &str) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;
        let mut collection_map = store.get_mut(collection);

        for id in ids {
            let key = id.to_string();

            let removed = collection_map
                .as_deref_mut()
                .and_then(|map| map.remove(&key));

            if removed.is_none() {
                return Err(DocumentStoreError::DocumentNotFound(key, collection.to_string()));
            }
        }

        Ok(())
    }

    async fn get_documents(&self, ids: Vec<Uuid>, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        Ok(
            ids.into_iter()
                .filter_map(|id| collection_map.get(&id.to_string()).cloned())
                .collect()
        )
    }

    async fn query_documents(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        let mut documents = match &query.filter {
            Some(filter) => DocumentEvaluator::filter_documents(collection_map.values(), filter)?,
            None => collection_map.values().cloned().collect::<Vec<_>>(),
        };

        if let Some(sort) = &query.sort {
            sort_documents(&mut documents, sort);
        }

        let window = documents
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX));

        Ok(match &query.projection {
            Some(fields) => window.map(|doc| project(doc, fields)).collect(),
            None => window.collect(),
        })
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// ```ignore
/// use libris_core::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder().build().await?;
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use libris_core::query::{Filter, Query};

    fn genre(name: &str) -> Bson {
        Bson::Document(doc! { "name": name })
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = InMemoryStore::new();
        let id = Uuid::new();

        store.insert_documents(vec![(id, genre("Poetry"))], "genres").await.unwrap();
        let err = store
            .insert_documents(vec![(id, genre("Drama"))], "genres")
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentStoreError::DocumentAlreadyExists(..)));
    }

    #[tokio::test]
    async fn update_merges_named_fields_and_returns_result() {
        let store = InMemoryStore::new();
        let id = Uuid::new();
        let original = Bson::Document(doc! { "first_name": "Ann", "family_name": "Leckie" });

        store.insert_documents(vec![(id, original)], "authors").await.unwrap();
        let updated = store
            .update_documents(vec![(id, doc! { "first_name": "Anne" })], "authors")
            .await
            .unwrap();

        assert_eq!(
            updated,
            vec![Bson::Document(doc! { "first_name": "Anne", "family_name": "Leckie" })]
        );
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_documents() {
        let store = InMemoryStore::new();
        let id = Uuid::new();

        let update = store
            .update_documents(vec![(id, doc! { "name": "x" })], "genres")
            .await
            .unwrap_err();
        let delete = store.delete_documents(vec![id], "genres").await.unwrap_err();

        assert!(update.is_not_found());
        assert!(delete.is_not_found());
    }

    #[tokio::test]
    async fn query_filters_by_uuid_reference() {
        let store = InMemoryStore::new();
        let author = Uuid::new();
        let other = Uuid::new();

        store
            .insert_documents(
                vec![
                    (Uuid::new(), Bson::Document(doc! { "title": "B", "author": author })),
                    (Uuid::new(), Bson::Document(doc! { "title": "A", "author": author })),
                    (Uuid::new(), Bson::Document(doc! { "title": "C", "author": other })),
                ],
                "books",
            )
            .await
            .unwrap();

        let query = Query::builder()
            .filter(Filter::eq("author", author))
            .sort("title", SortDirection::Asc)
            .project(["title"])
            .build();
        let docs = store.query_documents(query, "books").await.unwrap();

        assert_eq!(
            docs,
            vec![Bson::Document(doc! { "title": "A" }), Bson::Document(doc! { "title": "B" })]
        );
    }

    #[tokio::test]
    async fn query_windows_after_sorting() {
        let store = InMemoryStore::new();
        let genres = ["Drama", "Poetry", "Epic", "Fantasy"]
            .into_iter()
            .map(|name| (Uuid::new(), genre(name)))
            .collect();
        store.insert_documents(genres, "genres").await.unwrap();

        let query = Query::builder()
            .sort("name", SortDirection::Desc)
            .offset(1)
            .limit(2)
            .build();
        let docs = store.query_documents(query, "genres").await.unwrap();

        assert_eq!(docs, vec![genre("Fantasy"), genre("Epic")]);
    }

    #[tokio::test]
    async fn query_on_missing_collection_is_empty() {
        let store = InMemoryStore::new();
        let docs = store.query_documents(Query::new(), "nowhere").await.unwrap();

        assert!(docs.is_empty());
    }
}
