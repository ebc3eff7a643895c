use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub user_name: String,
    #[serde(skip_serializing)]
    pub user_password: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}
