use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::record_store::RecordStoreClient;

use crate::models::{AuthCellError, StoreUserRequest, UserRecord};

pub struct UserService {
    store: Arc<RecordStoreClient>,
}

impl UserService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(RecordStoreClient::new(config)),
        }
    }

    /// Upsert a user by its identity-provider subject. Existing records get
    /// their identity fields refreshed; new records default to the patient
    /// role.
    pub async fn store_user(
        &self,
        request: StoreUserRequest,
        auth_token: &str,
    ) -> Result<UserRecord, AuthCellError> {
        if request.token_identifier.is_empty() {
            return Err(AuthCellError::ValidationError(
                "token_identifier must not be empty".to_string(),
            ));
        }

        let query = format!("token_identifier=eq.{}", request.token_identifier);
        let existing: Option<UserRecord> = self
            .store
            .select_first("users", &query, Some(auth_token))
            .await
            .map_err(|e| AuthCellError::DatabaseError(e.to_string()))?;

        if let Some(user) = existing {
            debug!("Refreshing identity fields for user {}", user.id);

            let mut patched: Vec<UserRecord> = self
                .store
                .patch(
                    "users",
                    &format!("id=eq.{}", user.id),
                    json!({
                        "email": request.email,
                        "first_name": request.first_name,
                        "last_name": request.last_name,
                        "profile_picture_url": request.profile_picture_url,
                    }),
                    Some(auth_token),
                )
                .await
                .map_err(|e| AuthCellError::DatabaseError(e.to_string()))?;

            if patched.is_empty() {
                return Err(AuthCellError::DatabaseError(
                    "user patch returned no rows".to_string(),
                ));
            }
            return Ok(patched.remove(0));
        }

        info!("Creating user for subject {}", request.token_identifier);

        let created: UserRecord = self
            .store
            .insert(
                "users",
                json!({
                    "token_identifier": request.token_identifier,
                    "email": request.email,
                    "first_name": request.first_name,
                    "last_name": request.last_name,
                    "profile_picture_url": request.profile_picture_url,
                    "role": "patient",
                }),
                Some(auth_token),
            )
            .await
            .map_err(|e| AuthCellError::DatabaseError(e.to_string()))?;

        Ok(created)
    }
}
