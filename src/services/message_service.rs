use sqlx::{Pool, Postgres, Row};

use crate::error::AppResult;
use crate::models::message::{ChatMessage, MessageKind, NewMessage};

/// Thin interface over the append-only message log. The store is treated as
/// an opaque ordered log queried by creation time; there is no update or
/// delete path.
pub struct MessageService;

impl MessageService {
    /// Append one user message and return it exactly as a later history
    /// query would: with the store-assigned id and creation timestamp.
    pub async fn append(db: &Pool<Postgres>, msg: NewMessage) -> AppResult<ChatMessage> {
        let row = sqlx::query(
            "INSERT INTO messages (sender_name, body, image, display_time, kind) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, created_at",
        )
        .bind(&msg.sender_name)
        .bind(&msg.body)
        .bind(&msg.image)
        .bind(&msg.display_time)
        .bind(MessageKind::User.as_str())
        .fetch_one(db)
        .await?;

        Ok(ChatMessage {
            id: row.try_get("id")?,
            sender_name: msg.sender_name,
            body: msg.body,
            image: msg.image,
            display_time: msg.display_time,
            kind: MessageKind::User,
            created_at: row.try_get("created_at")?,
        })
    }

    /// The `limit` most recent messages, returned oldest to newest.
    pub async fn recent_history(db: &Pool<Postgres>, limit: i64) -> AppResult<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT id, sender_name, body, image, display_time, kind, created_at \
             FROM messages ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(db)
        .await?;

        let messages = rows
            .into_iter()
            .map(|row| {
                let kind: String = row.try_get("kind")?;
                Ok(ChatMessage {
                    id: row.try_get("id")?,
                    sender_name: row.try_get("sender_name")?,
                    body: row.try_get("body")?,
                    image: row.try_get("image")?,
                    display_time: row.try_get("display_time")?,
                    kind: MessageKind::parse(&kind),
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(history_window(messages, limit))
    }
}

/// The store query fetches newest-first so LIMIT keeps the right window;
/// clients expect that window oldest-first.
fn history_window(mut newest_first: Vec<ChatMessage>, limit: i64) -> Vec<ChatMessage> {
    newest_first.truncate(limit.max(0) as usize);
    newest_first.reverse();
    newest_first
}
