use crate::models::{DocumentStatus, IngestJob, TransactionMatch, UploadedDocument};
use crate::services::repository::{DocumentRepository, JobRepository};
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, Bson, DateTime as BsonDateTime, Document},
    options::{FindOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for document-service");

        // Client-scoped document lookups (gap analysis, listings)
        let client_index = IndexModel::builder()
            .keys(doc! { "firm_id": 1, "owner_client_id": 1, "created_at": 1 })
            .options(
                IndexOptions::builder()
                    .name("firm_client_lookup".to_string())
                    .build(),
            )
            .build();

        self.documents()
            .create_index(client_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create client index on documents collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on documents.(firm_id, owner_client_id, created_at)");

        let category_index = IndexModel::builder()
            .keys(doc! { "firm_id": 1, "category": 1 })
            .options(
                IndexOptions::builder()
                    .name("firm_category_lookup".to_string())
                    .build(),
            )
            .build();

        self.documents()
            .create_index(category_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create category index on documents collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on documents.(firm_id, category)");

        let job_index = IndexModel::builder()
            .keys(doc! { "firm_id": 1, "client_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("job_client_lookup".to_string())
                    .build(),
            )
            .build();

        self.jobs().create_index(job_index, None).await.map_err(|e| {
            tracing::error!("Failed to create index on ingest_jobs collection: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created index on ingest_jobs.(firm_id, client_id)");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn documents(&self) -> Collection<UploadedDocument> {
        self.db.collection("documents")
    }

    pub fn jobs(&self) -> Collection<IngestJob> {
        self.db.collection("ingest_jobs")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

#[async_trait]
impl DocumentRepository for MongoDb {
    async fn insert(&self, document: &UploadedDocument) -> Result<(), AppError> {
        self.documents().insert_one(document, None).await?;
        Ok(())
    }

    async fn get(
        &self,
        firm_id: &str,
        document_id: &str,
    ) -> Result<Option<UploadedDocument>, AppError> {
        Ok(self
            .documents()
            .find_one(doc! { "_id": document_id, "firm_id": firm_id }, None)
            .await?)
    }

    async fn list_for_client(
        &self,
        firm_id: &str,
        client_id: &str,
    ) -> Result<Vec<UploadedDocument>, AppError> {
        let options = FindOptions::builder().sort(doc! { "created_at": 1 }).build();
        let cursor = self
            .documents()
            .find(
                doc! { "firm_id": firm_id, "owner_client_id": client_id },
                options,
            )
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn save_verification(
        &self,
        document: &UploadedDocument,
        expected: DocumentStatus,
    ) -> Result<bool, AppError> {
        let update = doc! {
            "$set": {
                "status": document.status.as_str(),
                "verified_l1_by": to_bson(&document.verified_l1_by)?,
                "verified_l2_by": to_bson(&document.verified_l2_by)?,
                "updated_at": BsonDateTime::from_chrono(document.updated_at),
            }
        };
        let result = self
            .documents()
            .update_one(
                doc! {
                    "_id": document.id.as_str(),
                    "firm_id": document.firm_id.as_str(),
                    "status": expected.as_str(),
                },
                update,
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn ignore_transaction(
        &self,
        firm_id: &str,
        document_id: &str,
        index: usize,
    ) -> Result<bool, AppError> {
        let mut filter = doc! {
            "_id": document_id,
            "firm_id": firm_id,
            "status": { "$ne": DocumentStatus::VerifiedL2.as_str() },
        };
        filter.insert(format!("transactions.{}.type", index), "debit");

        let mut set = Document::new();
        set.insert(format!("transactions.{}.match_status", index), "ignored");
        set.insert(format!("transactions.{}.matched_document_id", index), Bson::Null);
        set.insert("updated_at", BsonDateTime::from_chrono(Utc::now()));

        let result = self
            .documents()
            .update_one(filter, doc! { "$set": set }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn apply_matches(
        &self,
        document_id: &str,
        matches: &[TransactionMatch],
    ) -> Result<usize, AppError> {
        let mut written = 0;
        for m in matches {
            let mut filter = doc! {
                "_id": document_id,
                "status": { "$ne": DocumentStatus::VerifiedL2.as_str() },
            };
            filter.insert(
                format!("transactions.{}.match_status", m.index),
                doc! { "$ne": "ignored" },
            );

            let mut set = Document::new();
            set.insert(format!("transactions.{}.match_status", m.index), to_bson(&m.status)?);
            set.insert(
                format!("transactions.{}.matched_document_id", m.index),
                to_bson(&m.matched_document_id)?,
            );
            set.insert("updated_at", BsonDateTime::from_chrono(Utc::now()));

            let result = self
                .documents()
                .update_one(filter, doc! { "$set": set }, None)
                .await?;
            written += result.modified_count as usize;
        }
        Ok(written)
    }

    async fn delete(&self, firm_id: &str, document_id: &str) -> Result<bool, AppError> {
        let result = self
            .documents()
            .delete_one(doc! { "_id": document_id, "firm_id": firm_id }, None)
            .await?;
        Ok(result.deleted_count > 0)
    }
}

#[async_trait]
impl JobRepository for MongoDb {
    async fn insert(&self, job: &IngestJob) -> Result<(), AppError> {
        self.jobs().insert_one(job, None).await?;
        Ok(())
    }

    async fn get(&self, firm_id: &str, job_id: &str) -> Result<Option<IngestJob>, AppError> {
        Ok(self
            .jobs()
            .find_one(doc! { "_id": job_id, "firm_id": firm_id }, None)
            .await?)
    }

    async fn save(&self, job: &IngestJob) -> Result<(), AppError> {
        self.jobs()
            .replace_one(doc! { "_id": job.id.as_str() }, job, None)
            .await?;
        Ok(())
    }
}
