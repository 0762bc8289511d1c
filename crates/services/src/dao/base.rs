use bson::{Document, doc, oid::ObjectId};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),
    #[error("BSON deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),
    #[error("Entity not found")]
    NotFound,
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Validation: {0}")]
    Validation(String),
}

pub type DaoResult<T> = Result<T, DaoError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    25
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResult<T> {
    pub fn next_page(&self) -> Option<u64> {
        (self.page < self.total_pages).then_some(self.page + 1)
    }
}

pub fn parse_object_id(raw: &str) -> DaoResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| DaoError::Validation(format!("invalid id: {raw}")))
}

pub struct BaseDao<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T> BaseDao<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<T>(collection_name),
        }
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DaoResult<T> {
        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_one(&self, filter: Document) -> DaoResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    /// Each document is decoded on its own; ones that do not fit `T` are
    /// skipped with a warning instead of failing the whole page.
    pub async fn find_paginated(
        &self,
        filter: Document,
        sort: Option<Document>,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<T>> {
        let raw = self.collection.clone_with_type::<Document>();
        let page = fetch_page(&raw, filter, sort, params).await?;

        let mut items = Vec::with_capacity(page.items.len());
        for doc in page.items {
            let id = doc.get_object_id("_id").ok();
            match bson::from_document::<T>(doc) {
                Ok(item) => items.push(item),
                Err(e) => warn!(
                    collection = %self.collection.name(),
                    ?id,
                    error = %e,
                    "Skipping undecodable document"
                ),
            }
        }

        Ok(PaginatedResult {
            items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages,
        })
    }

    pub async fn insert_one(&self, doc: &T) -> DaoResult<ObjectId> {
        let result = self.collection.insert_one(doc).await.map_err(|e| {
            if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
                ref write_error,
            )) = *e.kind
            {
                if write_error.code == 11000 {
                    return DaoError::DuplicateKey(write_error.message.clone());
                }
            }
            DaoError::Mongo(e)
        })?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| DaoError::Validation("inserted_id is not an ObjectId".to_string()))?;
        debug!(?id, "Inserted document");
        Ok(id)
    }

    pub async fn update_one(&self, filter: Document, update: Document) -> DaoResult<bool> {
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.modified_count > 0)
    }

    pub async fn update_many(&self, filter: Document, update: Document) -> DaoResult<u64> {
        let result = self.collection.update_many(filter, update).await?;
        Ok(result.modified_count)
    }

    pub async fn count(&self, filter: Document) -> DaoResult<u64> {
        Ok(self.collection.count_documents(filter).await?)
    }
}

async fn fetch_page<D>(
    collection: &Collection<D>,
    filter: Document,
    sort: Option<Document>,
    params: &PaginationParams,
) -> DaoResult<PaginatedResult<D>>
where
    D: for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    let page = params.page.max(1);
    let per_page = params.per_page.max(1);
    let total = collection.count_documents(filter.clone()).await?;
    let skip = (page - 1) * per_page;

    let sort = sort.unwrap_or_else(|| doc! { "created_at": -1 });

    let mut cursor = collection
        .find(filter)
        .sort(sort)
        .skip(skip)
        .limit(per_page as i64)
        .await?;

    let mut items = Vec::new();
    use futures::TryStreamExt;
    while let Some(doc) = cursor.try_next().await? {
        items.push(doc);
    }

    let total_pages = total.div_ceil(per_page);

    Ok(PaginatedResult {
        items,
        total,
        page,
        per_page,
        total_pages,
    })
}
