use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::pipeline::schemas::{ConversationTurn, TurnRole};

/// One stored conversation turn. "user" rows are inbound messages;
/// "system" rows carry the pipeline's response, with the structured stage
/// payload preserved in `auxiliary_data`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub content: String,
    pub auxiliary_data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<&MessageRow> for ConversationTurn {
    fn from(row: &MessageRow) -> Self {
        ConversationTurn {
            role: if row.role == "system" {
                TurnRole::System
            } else {
                TurnRole::User
            },
            content: row.content.clone(),
            auxiliary_data: row.auxiliary_data.clone(),
            timestamp: row.created_at,
        }
    }
}
