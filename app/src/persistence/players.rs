use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter, Set};

use models::domains::players;

use crate::error::AppError;

/// Insert-or-overwrite a player row. Last write wins; the read-model is
/// advisory and the stream may redeliver out of order.
pub async fn upsert_player(
    db: &DbConn,
    id: i32,
    username: &str,
    avatar: Option<&str>,
    timestamp: DateTime<Utc>,
) -> Result<(), AppError> {
    let row = players::ActiveModel {
        id: Set(id),
        username: Set(username.to_owned()),
        avatar: Set(avatar.map(str::to_owned)),
        updated_at: Set(timestamp.fixed_offset()),
    };

    players::Entity::insert(row)
        .on_conflict(
            OnConflict::column(players::Column::Id)
                .update_columns([
                    players::Column::Username,
                    players::Column::Avatar,
                    players::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(db)
        .await
        .map_err(AppError::from)?;
    Ok(())
}

/// Deleting an unknown player is a no-op, not an error.
pub async fn delete_player(db: &DbConn, id: i32) -> Result<(), AppError> {
    players::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(AppError::from)?;
    Ok(())
}

pub async fn get_player(db: &DbConn, id: i32) -> Result<Option<players::Model>, AppError> {
    players::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(AppError::from)
}

pub async fn get_player_by_username(
    db: &DbConn,
    username: &str,
) -> Result<Option<players::Model>, AppError> {
    players::Entity::find()
        .filter(players::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(AppError::from)
}
