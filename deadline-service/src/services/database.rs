use crate::models::{Deadline, FirmCalendar};
use crate::services::repository::{CalendarRepository, DeadlineRepository, UpsertSummary};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_document, DateTime as BsonDateTime},
    options::{FindOptions, IndexOptions, ReplaceOptions, UpdateOptions},
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
        tracing::info!("Creating MongoDB indexes for deadline-service");

        // One deadline per client, obligation and reporting period
        let natural_key_index = IndexModel::builder()
            .keys(doc! { "client_id": 1, "obligation_type": 1, "period_month": 1, "period_year": 1 })
            .options(
                IndexOptions::builder()
                    .name("deadline_natural_key".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.deadlines()
            .create_index(natural_key_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create natural key index on deadlines: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on deadlines.(client_id, obligation_type, period)");

        let firm_due_index = IndexModel::builder()
            .keys(doc! { "firm_id": 1, "due_date": 1 })
            .options(
                IndexOptions::builder()
                    .name("firm_due_lookup".to_string())
                    .build(),
            )
            .build();

        self.deadlines()
            .create_index(firm_due_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create firm_due index on deadlines: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on deadlines.(firm_id, due_date)");

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

    pub fn deadlines(&self) -> Collection<Deadline> {
        self.db.collection("deadlines")
    }

    pub fn calendars(&self) -> Collection<FirmCalendar> {
        self.db.collection("firm_calendars")
    }
}

#[async_trait]
impl DeadlineRepository for MongoDb {
    async fn upsert_many(&self, deadlines: &[Deadline]) -> Result<UpsertSummary, AppError> {
        let mut summary = UpsertSummary::default();
        let options = UpdateOptions::builder().upsert(true).build();

        for deadline in deadlines {
            let filter = doc! {
                "client_id": deadline.client_id.as_str(),
                "obligation_type": deadline.obligation_type.as_str(),
                "period_month": deadline.period_month,
                "period_year": deadline.period_year,
            };
            let update = doc! { "$setOnInsert": to_document(deadline)? };

            let result = self
                .deadlines()
                .update_one(filter, update, options.clone())
                .await
                .map_err(|e| {
                    tracing::error!(
                        client_id = %deadline.client_id,
                        obligation_type = %deadline.obligation_type,
                        "Failed to upsert deadline: {}",
                        e
                    );
                    AppError::from(e)
                })?;

            if result.upserted_id.is_some() {
                summary.inserted += 1;
            } else {
                summary.existing += 1;
            }
        }

        Ok(summary)
    }

    async fn list_for_client(
        &self,
        firm_id: &str,
        client_id: &str,
    ) -> Result<Vec<Deadline>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "due_date": 1, "obligation_type": 1 })
            .build();

        let cursor = self
            .deadlines()
            .find(doc! { "firm_id": firm_id, "client_id": client_id }, options)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn get(&self, firm_id: &str, deadline_id: &str) -> Result<Option<Deadline>, AppError> {
        Ok(self
            .deadlines()
            .find_one(doc! { "_id": deadline_id, "firm_id": firm_id }, None)
            .await?)
    }

    async fn save_filing(&self, deadline: &Deadline) -> Result<(), AppError> {
        let filed_at = deadline.filed_at.map(BsonDateTime::from_chrono);
        let update = doc! {
            "$set": {
                "status": deadline.status.as_str(),
                "filed_at": filed_at,
                "filed_by": deadline.filed_by.clone(),
            }
        };

        let result = self
            .deadlines()
            .update_one(doc! { "_id": deadline.id.as_str() }, update, None)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Deadline {} not found",
                deadline.id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarRepository for MongoDb {
    async fn get(&self, firm_id: &str) -> Result<Option<FirmCalendar>, AppError> {
        Ok(self.calendars().find_one(doc! { "_id": firm_id }, None).await?)
    }

    async fn put(&self, calendar: &FirmCalendar) -> Result<(), AppError> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.calendars()
            .replace_one(doc! { "_id": calendar.firm_id.as_str() }, calendar, options)
            .await?;
        Ok(())
    }
}
