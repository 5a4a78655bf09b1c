#![allow(dead_code)]

use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument, Uuid};
use libris::{prelude::*, query::Query};

/// A backend whose reads of one collection always fail. Shares its data with
/// the `InMemoryStore` it wraps.
#[derive(Debug, Clone)]
pub struct FlakyStore {
    inner: InMemoryStore,
    failing: &'static str,
}

impl FlakyStore {
    pub fn new(inner: InMemoryStore, failing: &'static str) -> Self {
        Self { inner, failing }
    }

    fn check(&self, collection: &str) -> DocumentStoreResult<()> {
        if collection == self.failing {
            return Err(DocumentStoreError::Backend(format!("{collection} is unreachable")));
        }

        Ok(())
    }
}

#[async_trait]
impl StoreBackend for FlakyStore {
    async fn insert_documents(&self, documents: Vec<(Uuid, Bson)>, collection: &str) -> DocumentStoreResult<()> {
        self.inner.insert_documents(documents, collection).await
    }

    async fn update_documents(
        &self,
        updates: Vec<(Uuid, BsonDocument)>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>> {
        self.inner.update_documents(updates, collection).await
    }

    async fn delete_documents(&self, ids: Vec<Uuid>, collection: &str) -> DocumentStoreResult<()> {
        self.inner.delete_documents(ids, collection).await
    }

    async fn get_documents(&self, ids: Vec<Uuid>, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        self.check(collection)?;
        self.inner.get_documents(ids, collection).await
    }

    async fn query_documents(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        self.check(collection)?;
        self.inner.query_documents(query, collection).await
    }
}

pub fn catalog() -> Catalog<InMemoryStore> {
    Catalog::new(DocumentStore::new(InMemoryStore::new()))
}

/// The id at the end of a canonical path.
pub fn id_of(outcome: &SaveOutcome) -> String {
    let path = outcome.path().expect("expected a saved outcome");
    path.rsplit('/').next().unwrap_or_default().to_string()
}

pub async fn create_author<B: StoreBackend>(catalog: &Catalog<B>, first: &str, family: &str) -> String {
    let form = FormData::new().with("first_name", first).with("family_name", family);
    id_of(&catalog.create_author(&form).await.unwrap())
}

pub async fn create_genre<B: StoreBackend>(catalog: &Catalog<B>, name: &str) -> String {
    let form = FormData::new().with("name", name);
    id_of(&catalog.create_genre(&form).await.unwrap())
}

pub async fn create_book<B: StoreBackend>(
    catalog: &Catalog<B>,
    title: &str,
    author: &str,
    genres: &[&str],
) -> String {
    let mut form = FormData::new()
        .with("title", title)
        .with("summary", format!("Summary of {title}"))
        .with("author", author);
    for genre in genres {
        form.insert("genre", *genre);
    }

    id_of(&catalog.create_book(&form).await.unwrap())
}

pub async fn create_instance<B: StoreBackend>(catalog: &Catalog<B>, book: &str, imprint: &str) -> String {
    let form = FormData::new().with("book", book).with("imprint", imprint);
    id_of(&catalog.create_instance(&form).await.unwrap())
}
