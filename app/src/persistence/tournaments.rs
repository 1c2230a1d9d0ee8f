use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbConn, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};

use models::domains::sea_orm_active_enums::{MatchRound, TournamentStatus};
use models::domains::{matches, players, tournament_players, tournaments};
use models::queries::PaginationQuery;
use models::schemas::pagination::PaginatedData;
use models::schemas::player::Principal;
use models::schemas::tournament::{
    TournamentDetailSchema, TournamentPlayerSchema, TournamentSchema,
};

use crate::error::AppError;

use super::{ID_ALPHABET, SESSION_ID_LENGTH, TOURNAMENT_ID_LENGTH};

const TOURNAMENT_CAPACITY: usize = 4;

/// Final score of a live session mapped onto the match row's player order.
pub struct MatchOutcome {
    pub score_a: i32,
    pub score_b: i32,
    pub winner_id: i32,
}

/// Create a tournament with the caller in slot 1.
pub async fn create_tournament(
    db: &DbConn,
    principal: &Principal,
) -> Result<tournaments::Model, AppError> {
    require_player(db, principal.id).await?;

    let id = nanoid::nanoid!(TOURNAMENT_ID_LENGTH, &ID_ALPHABET);
    let creator = principal.id;
    let created = db
        .transaction::<_, tournaments::Model, AppError>(move |txn| {
            Box::pin(async move {
                let tournament = tournaments::ActiveModel {
                    id: Set(id),
                    created_by: Set(creator),
                    status: Set(TournamentStatus::Pending),
                    created_at: Set(Utc::now().fixed_offset()),
                }
                .insert(txn)
                .await
                .map_err(AppError::from)?;

                tournament_players::ActiveModel {
                    tournament_id: Set(tournament.id.clone()),
                    player_id: Set(creator),
                    slot: Set(1),
                    position: Set(None),
                }
                .insert(txn)
                .await
                .map_err(AppError::from)?;

                info!(tournament = %tournament.id, creator, "tournament created");
                Ok(tournament)
            })
        })
        .await?;

    Ok(created)
}

/// Join a pending tournament. Re-joining is a no-op; the roster and capacity
/// are re-read inside the transaction, which is what defuses two racing
/// joiners both seeing three occupied slots. The fourth distinct join flips
/// the tournament to STARTED and seeds both semifinals atomically.
pub async fn join_tournament(
    db: &DbConn,
    principal: &Principal,
    tournament_id: &str,
) -> Result<tournaments::Model, AppError> {
    require_player(db, principal.id).await?;

    let tid = tournament_id.to_owned();
    let player_id = principal.id;
    let updated = db
        .transaction::<_, tournaments::Model, AppError>(move |txn| {
            Box::pin(async move {
                let tournament = tournaments::Entity::find_by_id(tid.clone())
                    .one(txn)
                    .await
                    .map_err(AppError::from)?
                    .ok_or_else(|| AppError::not_found("tournament not found"))?;

                let members = tournament_players::Entity::find()
                    .filter(tournament_players::Column::TournamentId.eq(&tid))
                    .order_by_asc(tournament_players::Column::Slot)
                    .all(txn)
                    .await
                    .map_err(AppError::from)?;

                if members.iter().any(|m| m.player_id == player_id) {
                    return Ok(tournament);
                }
                if tournament.status != TournamentStatus::Pending {
                    return Err(AppError::conflict("tournament already started"));
                }
                if members.len() >= TOURNAMENT_CAPACITY {
                    return Err(AppError::conflict("tournament full"));
                }

                let next_slot = members.iter().map(|m| m.slot).max().unwrap_or(0) + 1;
                let joined = tournament_players::ActiveModel {
                    tournament_id: Set(tid.clone()),
                    player_id: Set(player_id),
                    slot: Set(next_slot),
                    position: Set(None),
                }
                .insert(txn)
                .await
                .map_err(AppError::from)?;

                if members.len() + 1 < TOURNAMENT_CAPACITY {
                    return Ok(tournament);
                }

                let mut roster = members;
                roster.push(joined);
                roster.sort_by_key(|m| m.slot);

                let mut active: tournaments::ActiveModel = tournament.into();
                active.status = Set(TournamentStatus::Started);
                let tournament = active.update(txn).await.map_err(AppError::from)?;

                create_bracket_match(
                    txn,
                    &tid,
                    MatchRound::Semi1,
                    roster[0].player_id,
                    roster[1].player_id,
                )
                .await?;
                create_bracket_match(
                    txn,
                    &tid,
                    MatchRound::Semi2,
                    roster[2].player_id,
                    roster[3].player_id,
                )
                .await?;

                info!(tournament = %tid, "tournament started, semifinals generated");
                Ok(tournament)
            })
        })
        .await?;

    Ok(updated)
}

/// Finalize a match and drive the bracket forward. The whole step is one
/// transaction: score finalization, the finished-semifinal count, and any
/// follow-on generation commit or roll back together.
pub async fn record_match_result(
    db: &DbConn,
    match_id: i32,
    outcome: MatchOutcome,
) -> Result<(), AppError> {
    db.transaction::<_, (), AppError>(move |txn| {
        Box::pin(async move {
            let row = matches::Entity::find_by_id(match_id)
                .one(txn)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::not_found("match not found"))?;

            if row.winner_id.is_some() {
                warn!(match_id, "result for an already resolved match ignored");
                return Ok(());
            }
            if outcome.winner_id != row.player_a && outcome.winner_id != row.player_b {
                return Err(AppError::validation("winner is not a participant of this match"));
            }

            let tournament_id = row.tournament_id.clone();
            let round = row.round;
            let mut active: matches::ActiveModel = row.into();
            active.score_a = Set(outcome.score_a);
            active.score_b = Set(outcome.score_b);
            active.winner_id = Set(Some(outcome.winner_id));
            active.update(txn).await.map_err(AppError::from)?;

            let Some(tournament_id) = tournament_id else {
                return Ok(());
            };
            match round {
                Some(MatchRound::Semi1 | MatchRound::Semi2) => {
                    advance_bracket(txn, &tournament_id).await
                }
                Some(MatchRound::Final | MatchRound::LittleFinal) => {
                    conclude_tournament(txn, &tournament_id).await
                }
                None => Ok(()),
            }
        })
    })
    .await
    .map_err(AppError::from)
}

pub async fn search_open_tournaments(
    db: &DbConn,
    query: PaginationQuery,
) -> Result<PaginatedData<TournamentSchema>, AppError> {
    let limit = query.limit.unwrap_or(15);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * limit;

    let open = tournaments::Column::Status
        .is_in([TournamentStatus::Pending, TournamentStatus::Started]);

    let total = tournaments::Entity::find()
        .filter(open.clone())
        .count(db)
        .await
        .map_err(AppError::from)?;

    let data = tournaments::Entity::find()
        .filter(open)
        .order_by_desc(tournaments::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(TournamentSchema::from)
        .collect();

    Ok(PaginatedData::new(data, page, limit, total))
}

/// Tournament plus its slot roster in slot order.
pub async fn get_tournament(db: &DbConn, id: &str) -> Result<TournamentDetailSchema, AppError> {
    let tournament = tournaments::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("tournament not found"))?;

    let roster = tournament_players::Entity::find()
        .filter(tournament_players::Column::TournamentId.eq(id))
        .find_also_related(players::Entity)
        .order_by_asc(tournament_players::Column::Slot)
        .all(db)
        .await
        .map_err(AppError::from)?;

    Ok(TournamentDetailSchema {
        tournament: tournament.into(),
        players: roster
            .into_iter()
            .map(|(row, player)| TournamentPlayerSchema::new(row, player.map(|p| p.username)))
            .collect(),
    })
}

async fn require_player(db: &DbConn, id: i32) -> Result<players::Model, AppError> {
    players::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("player not registered"))
}

async fn create_bracket_match<C: ConnectionTrait>(
    db: &C,
    tournament_id: &str,
    round: MatchRound,
    player_a: i32,
    player_b: i32,
) -> Result<matches::Model, AppError> {
    matches::ActiveModel {
        tournament_id: Set(Some(tournament_id.to_owned())),
        player_a: Set(player_a),
        player_b: Set(player_b),
        session_id: Set(Some(nanoid::nanoid!(SESSION_ID_LENGTH, &ID_ALPHABET))),
        score_a: Set(0),
        score_b: Set(0),
        winner_id: Set(None),
        round: Set(Some(round)),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(AppError::from)
}

/// Generate FINAL and LITTLE_FINAL once both semifinal winners are known.
/// Two completion handlers may get here near-simultaneously; the unique
/// (tournament, round) index turns the loser of that race into a logged
/// no-op rather than a duplicated bracket.
async fn advance_bracket(txn: &DatabaseTransaction, tournament_id: &str) -> Result<(), AppError> {
    let semis = matches::Entity::find()
        .filter(matches::Column::TournamentId.eq(tournament_id))
        .filter(matches::Column::Round.is_in([MatchRound::Semi1, MatchRound::Semi2]))
        .order_by_asc(matches::Column::Id)
        .all(txn)
        .await
        .map_err(AppError::from)?;

    let mut winners = Vec::new();
    let mut losers = Vec::new();
    for semi in &semis {
        let Some(winner) = semi.winner_id else {
            return Ok(());
        };
        winners.push(winner);
        losers.push(if winner == semi.player_a {
            semi.player_b
        } else {
            semi.player_a
        });
    }
    if winners.len() < 2 {
        return Ok(());
    }

    match create_bracket_match(txn, tournament_id, MatchRound::Final, winners[0], winners[1]).await
    {
        Ok(_) => {}
        Err(AppError::Conflict(_)) => {
            warn!(tournament = %tournament_id, "final round already generated");
            return Ok(());
        }
        Err(err) => return Err(err),
    }
    match create_bracket_match(txn, tournament_id, MatchRound::LittleFinal, losers[0], losers[1])
        .await
    {
        Ok(_) => {}
        Err(AppError::Conflict(_)) => {
            warn!(tournament = %tournament_id, "consolation round already generated");
            return Ok(());
        }
        Err(err) => return Err(err),
    }

    info!(tournament = %tournament_id, "final and consolation matches generated");
    Ok(())
}

/// Once the final and the consolation match both have winners, the
/// tournament is finished and standings 1-4 are recorded.
async fn conclude_tournament(
    txn: &DatabaseTransaction,
    tournament_id: &str,
) -> Result<(), AppError> {
    let rounds = matches::Entity::find()
        .filter(matches::Column::TournamentId.eq(tournament_id))
        .filter(matches::Column::Round.is_in([MatchRound::Final, MatchRound::LittleFinal]))
        .all(txn)
        .await
        .map_err(AppError::from)?;

    let decider = rounds
        .iter()
        .find(|m| m.round == Some(MatchRound::Final));
    let consolation = rounds
        .iter()
        .find(|m| m.round == Some(MatchRound::LittleFinal));
    let (Some(decider), Some(consolation)) = (decider, consolation) else {
        return Ok(());
    };
    let (Some(champion), Some(third)) = (decider.winner_id, consolation.winner_id) else {
        return Ok(());
    };

    let runner_up = if champion == decider.player_a {
        decider.player_b
    } else {
        decider.player_a
    };
    let fourth = if third == consolation.player_a {
        consolation.player_b
    } else {
        consolation.player_a
    };

    for (player_id, position) in [(champion, 1), (runner_up, 2), (third, 3), (fourth, 4)] {
        let Some(row) = tournament_players::Entity::find_by_id((tournament_id.to_owned(), player_id))
            .one(txn)
            .await
            .map_err(AppError::from)?
        else {
            continue;
        };
        let mut active: tournament_players::ActiveModel = row.into();
        active.position = Set(Some(position));
        active.update(txn).await.map_err(AppError::from)?;
    }

    let tournament = tournaments::Entity::find_by_id(tournament_id)
        .one(txn)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("tournament not found"))?;
    let mut active: tournaments::ActiveModel = tournament.into();
    active.status = Set(TournamentStatus::Finished);
    active.update(txn).await.map_err(AppError::from)?;

    info!(tournament = %tournament_id, champion, "tournament finished");
    Ok(())
}
