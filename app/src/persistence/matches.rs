use sea_orm::{ColumnTrait, Condition, DbConn, EntityTrait, QueryFilter};

use models::domains::matches;

use crate::error::AppError;

pub async fn get_match(db: &DbConn, id: i32) -> Result<matches::Model, AppError> {
    matches::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("match not found"))
}

pub async fn get_match_by_session(
    db: &DbConn,
    session_id: &str,
) -> Result<Option<matches::Model>, AppError> {
    matches::Entity::find()
        .filter(matches::Column::SessionId.eq(session_id))
        .one(db)
        .await
        .map_err(AppError::from)
}

/// The single unresolved match the caller is expected to play: they are a
/// named participant, the live session has been minted, and no winner is
/// recorded yet. Absence is a business condition, not a fault.
pub async fn match_to_play(
    db: &DbConn,
    tournament_id: &str,
    player_id: i32,
) -> Result<matches::Model, AppError> {
    matches::Entity::find()
        .filter(matches::Column::TournamentId.eq(tournament_id))
        .filter(matches::Column::WinnerId.is_null())
        .filter(matches::Column::SessionId.is_not_null())
        .filter(
            Condition::any()
                .add(matches::Column::PlayerA.eq(player_id))
                .add(matches::Column::PlayerB.eq(player_id)),
        )
        .one(db)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("no match to play"))
}
