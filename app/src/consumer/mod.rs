use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use redis::aio::MultiplexedConnection;
use redis::streams::{
    StreamAutoClaimOptions, StreamAutoClaimReply, StreamId, StreamReadOptions, StreamReadReply,
};
use redis::AsyncCommands;
use sea_orm::DatabaseConnection;
use tokio::sync::watch;
use tracing::{error, info, warn};

use models::events::UserEvent;

use crate::config::Config;
use crate::error::AppError;
use crate::persistence::players;

/// The blocking read is bounded so the loop re-checks the shutdown flag at
/// least this often.
const READ_BLOCK_MILLIS: usize = 5_000;
const RECLAIM_EVERY: u64 = 10;
const RECLAIM_MIN_IDLE_MILLIS: usize = 30_000;
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Keep the player read-model in sync with the auth service's user stream.
///
/// Competing-consumer-group reader: entries are acknowledged only after the
/// local write lands, so a crash mid-handling leaves them pending and a
/// later pass reclaims them. Runs until the shutdown flag flips; transient
/// redis failures are logged and retried, never fatal.
pub async fn run_consumer(
    config: Config,
    conn: DatabaseConnection,
    shutdown: watch::Receiver<bool>,
) {
    info!(
        stream = %config.user_stream,
        group = %config.consumer_group,
        consumer = %config.consumer_name,
        "user event consumer starting"
    );

    while !*shutdown.borrow() {
        match consume(&config, &conn, &shutdown).await {
            Ok(()) => break,
            Err(err) => {
                warn!("user event consumer error: {err:#}; reconnecting");
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
        }
    }

    info!("user event consumer stopped");
}

async fn consume(
    config: &Config,
    db: &DatabaseConnection,
    shutdown: &watch::Receiver<bool>,
) -> Result<()> {
    let client = redis::Client::open(config.redis_url.as_str()).context("invalid redis url")?;
    let mut redis = client
        .get_multiplexed_async_connection()
        .await
        .context("redis connection failed")?;

    ensure_group(&mut redis, config).await?;

    let mut iteration: u64 = 0;
    loop {
        if *shutdown.borrow() {
            return Ok(());
        }
        iteration += 1;

        // bound the staleness of entries claimed by a consumer that died
        if iteration % RECLAIM_EVERY == 0 {
            reclaim_stalled(&mut redis, db, config).await?;
        }

        let options = StreamReadOptions::default()
            .group(&config.consumer_group, &config.consumer_name)
            .count(1)
            .block(READ_BLOCK_MILLIS);
        let reply: StreamReadReply = redis
            .xread_options(&[config.user_stream.as_str()], &[">"], &options)
            .await?;

        for key in reply.keys {
            for entry in key.ids {
                handle_entry(&mut redis, db, config, &entry).await?;
            }
        }
    }
}

/// Idempotent group bootstrap at the stream origin; "already exists" is not
/// an error.
async fn ensure_group(redis: &mut MultiplexedConnection, config: &Config) -> Result<()> {
    let created: redis::RedisResult<String> = redis
        .xgroup_create_mkstream(
            config.user_stream.as_str(),
            config.consumer_group.as_str(),
            "$",
        )
        .await;
    match created {
        Ok(_) => info!(group = %config.consumer_group, "consumer group created"),
        Err(err) if err.to_string().contains("BUSYGROUP") => {}
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

async fn handle_entry(
    redis: &mut MultiplexedConnection,
    db: &DatabaseConnection,
    config: &Config,
    entry: &StreamId,
) -> Result<()> {
    match parse_entry(entry) {
        Ok(event) => match apply_event(db, &event).await {
            Ok(()) => ack(redis, config, &entry.id).await,
            Err(err) => {
                // no ack: the entry stays pending and will be redelivered
                warn!(
                    entry = %entry.id,
                    player = event.player_id(),
                    "read-model write failed, leaving entry pending: {err}"
                );
                Ok(())
            }
        },
        Err(err) => {
            // a payload that can never parse would otherwise redeliver forever
            error!(entry = %entry.id, "rejecting malformed user event: {err}");
            ack(redis, config, &entry.id).await
        }
    }
}

fn parse_entry(entry: &StreamId) -> Result<UserEvent> {
    let payload: String = entry
        .get("payload")
        .ok_or_else(|| anyhow!("entry {} has no payload field", entry.id))?;
    parse_payload(&payload)
}

fn parse_payload(payload: &str) -> Result<UserEvent> {
    serde_json::from_str(payload).map_err(|err| anyhow!("unparseable user event: {err}"))
}

/// CREATED/UPDATED upsert the player row, DELETED removes it. This is the
/// only writer of the `players` table.
pub async fn apply_event(db: &DatabaseConnection, event: &UserEvent) -> Result<(), AppError> {
    match event {
        UserEvent::Created {
            id,
            username,
            avatar,
            timestamp,
        }
        | UserEvent::Updated {
            id,
            username,
            avatar,
            timestamp,
        } => players::upsert_player(db, *id, username, avatar.as_deref(), *timestamp).await,
        UserEvent::Deleted { id, .. } => players::delete_player(db, *id).await,
    }
}

/// Re-assign entries that have sat unacknowledged past the idle threshold to
/// this consumer and process them like fresh deliveries.
async fn reclaim_stalled(
    redis: &mut MultiplexedConnection,
    db: &DatabaseConnection,
    config: &Config,
) -> Result<()> {
    let reply: StreamAutoClaimReply = redis
        .xautoclaim_options(
            config.user_stream.as_str(),
            config.consumer_group.as_str(),
            config.consumer_name.as_str(),
            RECLAIM_MIN_IDLE_MILLIS,
            "0-0",
            StreamAutoClaimOptions::default(),
        )
        .await?;

    if !reply.claimed.is_empty() {
        info!(count = reply.claimed.len(), "reclaimed stalled user events");
    }
    for entry in &reply.claimed {
        handle_entry(redis, db, config, entry).await?;
    }
    Ok(())
}

async fn ack(redis: &mut MultiplexedConnection, config: &Config, entry_id: &str) -> Result<()> {
    let _: i64 = redis
        .xack(
            config.user_stream.as_str(),
            config.consumer_group.as_str(),
            &[entry_id],
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn created_and_updated_events_parse() {
        let event = parse_payload(
            r#"{"type":"CREATED","id":7,"username":"ada","avatar":"a.png","timestamp":"2025-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            UserEvent::Created {
                id: 7,
                username: "ada".into(),
                avatar: Some("a.png".into()),
                timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            }
        );

        let event = parse_payload(
            r#"{"type":"UPDATED","id":7,"username":"ada2","timestamp":"2025-03-02T12:00:00Z"}"#,
        )
        .unwrap();
        assert!(matches!(event, UserEvent::Updated { avatar: None, .. }));
    }

    #[test]
    fn deleted_event_parses_without_profile_fields() {
        let event =
            parse_payload(r#"{"type":"DELETED","id":9,"timestamp":"2025-03-03T00:00:00Z"}"#)
                .unwrap();
        assert_eq!(event.player_id(), 9);
    }

    #[test]
    fn unknown_tags_are_rejected_not_ignored() {
        let err = parse_payload(
            r#"{"type":"BANNED","id":9,"timestamp":"2025-03-03T00:00:00Z"}"#,
        );
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn events_drive_the_read_model() {
        let db = utils::testing::setup_test_db("sqlite::memory:").await.unwrap();
        let created = UserEvent::Created {
            id: 1,
            username: "ada".into(),
            avatar: None,
            timestamp: Utc::now(),
        };
        apply_event(&db, &created).await.unwrap();

        let updated = UserEvent::Updated {
            id: 1,
            username: "countess".into(),
            avatar: Some("ada.png".into()),
            timestamp: Utc::now(),
        };
        // redelivery of an upsert is harmless: last write wins
        apply_event(&db, &updated).await.unwrap();
        apply_event(&db, &updated).await.unwrap();

        let row = players::get_player(&db, 1).await.unwrap().unwrap();
        assert_eq!(row.username, "countess");
        assert_eq!(row.avatar.as_deref(), Some("ada.png"));

        let deleted = UserEvent::Deleted {
            id: 1,
            timestamp: Utc::now(),
        };
        apply_event(&db, &deleted).await.unwrap();
        assert!(players::get_player(&db, 1).await.unwrap().is_none());
    }
}
