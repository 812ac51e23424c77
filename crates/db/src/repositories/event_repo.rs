//! Repository for the `events` and `event_types` tables.

use adapt_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{Event, EventType};

/// Column list for `event_types` queries.
const EVENT_TYPE_COLUMNS: &str =
    "id, name, category, description, is_critical, created_at, updated_at";

/// Column list for `events` queries.
const EVENT_COLUMNS: &str =
    "id, event_type_id, source_entity_type, source_entity_id, actor, payload, created_at";

/// Provides read/write operations for events and event types.
pub struct EventRepo;

impl EventRepo {
    /// Find an event type by its dot-separated name (e.g. `"run.completed"`).
    pub async fn get_event_type_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<EventType>, sqlx::Error> {
        let query = format!("SELECT {EVENT_TYPE_COLUMNS} FROM event_types WHERE name = $1");
        sqlx::query_as::<_, EventType>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_event_types(pool: &PgPool) -> Result<Vec<EventType>, sqlx::Error> {
        let query = format!("SELECT {EVENT_TYPE_COLUMNS} FROM event_types ORDER BY category, name");
        sqlx::query_as::<_, EventType>(&query).fetch_all(pool).await
    }

    /// Insert a new event row, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        event_type_id: DbId,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor: Option<&str>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events \
                (event_type_id, source_entity_type, source_entity_id, actor, payload) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(event_type_id)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// Events recorded for one entity, oldest first.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE source_entity_type = $1 AND source_entity_id = $2 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }
}
