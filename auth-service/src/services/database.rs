//! MongoDB access layer for the session/credential subsystem.
//!
//! Every lookup filters on `status: true`; retired users, roles, keys and
//! keystores are invisible to the rest of the service.

use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::IndexOptions,
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

use crate::models::{ApiKey, Keystore, Role, RoleCode, User};

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for auth-service");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("email_lookup".to_string())
                    .build(),
            )
            .build();
        self.users().create_index(email_index, None).await?;

        let role_code_index = IndexModel::builder()
            .keys(doc! { "code": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("code_lookup".to_string())
                    .build(),
            )
            .build();
        self.roles().create_index(role_code_index, None).await?;

        let api_key_index = IndexModel::builder()
            .keys(doc! { "key": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("key_lookup".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.api_keys().create_index(api_key_index, None).await?;

        let keystore_index = IndexModel::builder()
            .keys(doc! { "client": 1, "primary_key": 1, "secondary_key": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("session_lookup".to_string())
                    .build(),
            )
            .build();
        self.keystores().create_index(keystore_index, None).await?;

        tracing::info!("Database indexes initialized");
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

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn roles(&self) -> Collection<Role> {
        self.db.collection("roles")
    }

    pub fn api_keys(&self) -> Collection<ApiKey> {
        self.db.collection("api_keys")
    }

    pub fn keystores(&self) -> Collection<Keystore> {
        self.db.collection("keystores")
    }

    // ==================== User directory ====================

    /// Find an active user by id, role memberships included.
    pub async fn find_user_by_id(&self, id: ObjectId) -> Result<Option<User>, AppError> {
        Ok(self
            .users()
            .find_one(doc! { "_id": id, "status": true }, None)
            .await?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users()
            .find_one(doc! { "email": email, "status": true }, None)
            .await?)
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.users().insert_one(user, None).await?;
        Ok(())
    }

    /// Resolve the active roles behind a user's role id list. The explicit
    /// fetch replaces document-store lazy population.
    pub async fn find_active_roles(&self, role_ids: &[ObjectId]) -> Result<Vec<Role>, AppError> {
        let cursor = self
            .roles()
            .find(doc! { "_id": { "$in": role_ids }, "status": true }, None)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    // ==================== Role directory ====================

    pub async fn find_role_by_code(&self, code: RoleCode) -> Result<Option<Role>, AppError> {
        Ok(self
            .roles()
            .find_one(doc! { "code": code.as_str(), "status": true }, None)
            .await?)
    }

    pub async fn insert_role(&self, role: &Role) -> Result<(), AppError> {
        self.roles().insert_one(role, None).await?;
        Ok(())
    }

    pub async fn delete_role_by_code(&self, code: RoleCode) -> Result<u64, AppError> {
        let result = self
            .roles()
            .delete_one(doc! { "code": code.as_str() }, None)
            .await?;
        Ok(result.deleted_count)
    }

    // ==================== Service-key directory ====================

    pub async fn find_api_key(&self, key: &str) -> Result<Option<ApiKey>, AppError> {
        Ok(self
            .api_keys()
            .find_one(doc! { "key": key, "status": true }, None)
            .await?)
    }

    pub async fn insert_api_key(&self, api_key: &ApiKey) -> Result<(), AppError> {
        self.api_keys().insert_one(api_key, None).await?;
        Ok(())
    }

    pub async fn delete_api_key(&self, key: &str) -> Result<u64, AppError> {
        let result = self.api_keys().delete_one(doc! { "key": key }, None).await?;
        Ok(result.deleted_count)
    }

    // ==================== Session store (keystore) ====================

    pub async fn insert_keystore(&self, keystore: &Keystore) -> Result<(), AppError> {
        self.keystores().insert_one(keystore, None).await?;
        Ok(())
    }

    /// Confirm a presented access token still denotes a live session for
    /// this user.
    pub async fn find_keystore(
        &self,
        client: ObjectId,
        primary_key: &str,
    ) -> Result<Option<Keystore>, AppError> {
        Ok(self
            .keystores()
            .find_one(
                doc! { "client": client, "primary_key": primary_key, "status": true },
                None,
            )
            .await?)
    }

    /// Refresh-only lookup: the exact access+refresh pair must still map to
    /// one undestroyed session.
    pub async fn find_keystore_by_pair(
        &self,
        client: ObjectId,
        primary_key: &str,
        secondary_key: &str,
    ) -> Result<Option<Keystore>, AppError> {
        Ok(self
            .keystores()
            .find_one(
                doc! {
                    "client": client,
                    "primary_key": primary_key,
                    "secondary_key": secondary_key,
                    "status": true,
                },
                None,
            )
            .await?)
    }

    /// Atomically claim and remove the session for the exact access+refresh
    /// pair. Of N concurrent refreshes of one pair, exactly one gets the
    /// record; the rest see `None`.
    pub async fn consume_keystore_pair(
        &self,
        client: ObjectId,
        primary_key: &str,
        secondary_key: &str,
    ) -> Result<Option<Keystore>, AppError> {
        Ok(self
            .keystores()
            .find_one_and_delete(
                doc! {
                    "client": client,
                    "primary_key": primary_key,
                    "secondary_key": secondary_key,
                    "status": true,
                },
                None,
            )
            .await?)
    }

    /// Idempotent: deleting a missing keystore is not an error.
    pub async fn delete_keystore(&self, id: ObjectId) -> Result<(), AppError> {
        self.keystores().delete_one(doc! { "_id": id }, None).await?;
        Ok(())
    }

    /// Sign-out-everywhere: drop every session record for the user.
    pub async fn delete_keystores_for_client(&self, client: ObjectId) -> Result<u64, AppError> {
        let result = self
            .keystores()
            .delete_many(doc! { "client": client }, None)
            .await?;
        Ok(result.deleted_count)
    }
}
