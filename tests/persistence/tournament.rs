use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use app::error::AppError;
use app::persistence::matches::match_to_play;
use app::persistence::tournaments::{
    MatchOutcome, create_tournament, get_tournament, join_tournament, record_match_result,
};
use models::domains::sea_orm_active_enums::{MatchRound, TournamentStatus};
use models::domains::{matches, tournament_players};
use models::schemas::player::Principal;

fn principal(id: i32) -> Principal {
    Principal {
        id,
        username: format!("player-{id}"),
    }
}

async fn bracket_rounds(db: &DatabaseConnection, tournament_id: &str) -> Vec<matches::Model> {
    matches::Entity::find()
        .filter(matches::Column::TournamentId.eq(tournament_id))
        .order_by_asc(matches::Column::Id)
        .all(db)
        .await
        .expect("Match lookup failed!")
}

/// Fill a tournament to capacity: creator takes slot 1, players 2-4 join.
async fn start_tournament(db: &DatabaseConnection) -> (String, Vec<matches::Model>) {
    let tournament = create_tournament(db, &principal(1))
        .await
        .expect("Create tournament failed!");

    for id in [2, 3] {
        let pending = join_tournament(db, &principal(id), &tournament.id)
            .await
            .expect("Join failed!");
        assert_eq!(pending.status, TournamentStatus::Pending);
    }

    let started = join_tournament(db, &principal(4), &tournament.id)
        .await
        .expect("Fourth join failed!");
    assert_eq!(started.status, TournamentStatus::Started);

    let semis = bracket_rounds(db, &tournament.id).await;
    (tournament.id, semis)
}

pub(super) async fn test_join_idempotent(db: &DatabaseConnection) {
    let tournament = create_tournament(db, &principal(1))
        .await
        .expect("Create tournament failed!");

    join_tournament(db, &principal(2), &tournament.id)
        .await
        .expect("Join failed!");
    join_tournament(db, &principal(2), &tournament.id)
        .await
        .expect("Repeat join must be a no-op!");

    let members = tournament_players::Entity::find()
        .filter(tournament_players::Column::TournamentId.eq(&tournament.id))
        .order_by_asc(tournament_players::Column::Slot)
        .all(db)
        .await
        .expect("Roster lookup failed!");

    assert_eq!(members.len(), 2);
    assert_eq!(members[0].player_id, 1);
    assert_eq!(members[0].slot, 1);
    assert_eq!(members[1].player_id, 2);
    assert_eq!(members[1].slot, 2);
}

pub(super) async fn test_fourth_join_starts(db: &DatabaseConnection) {
    let (tournament_id, semis) = start_tournament(db).await;

    assert_eq!(semis.len(), 2);

    let semi_1 = &semis[0];
    assert_eq!(semi_1.round, Some(MatchRound::Semi1));
    assert_eq!((semi_1.player_a, semi_1.player_b), (1, 2));
    assert!(semi_1.session_id.is_some());

    let semi_2 = &semis[1];
    assert_eq!(semi_2.round, Some(MatchRound::Semi2));
    assert_eq!((semi_2.player_a, semi_2.player_b), (3, 4));
    assert!(semi_2.session_id.is_some());

    assert_ne!(semi_1.session_id, semi_2.session_id);

    let detail = get_tournament(db, &tournament_id)
        .await
        .expect("Detail lookup failed!");
    assert_eq!(detail.players.len(), 4);
    assert_eq!(
        detail.players.iter().map(|p| p.slot).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
}

pub(super) async fn test_join_after_start_conflicts(db: &DatabaseConnection) {
    let (tournament_id, _) = start_tournament(db).await;

    let refused = join_tournament(db, &principal(5), &tournament_id).await;
    assert!(matches!(refused, Err(AppError::Conflict(_))));

    let members = tournament_players::Entity::find()
        .filter(tournament_players::Column::TournamentId.eq(&tournament_id))
        .all(db)
        .await
        .expect("Roster lookup failed!");
    assert_eq!(members.len(), 4);
}

pub(super) async fn test_bracket_generated_once(db: &DatabaseConnection) {
    let (tournament_id, semis) = start_tournament(db).await;

    record_match_result(
        db,
        semis[0].id,
        MatchOutcome {
            score_a: 5,
            score_b: 2,
            winner_id: 1,
        },
    )
    .await
    .expect("Record semi 1 failed!");

    // one semifinal is not enough to generate anything
    assert_eq!(bracket_rounds(db, &tournament_id).await.len(), 2);

    record_match_result(
        db,
        semis[1].id,
        MatchOutcome {
            score_a: 5,
            score_b: 4,
            winner_id: 3,
        },
    )
    .await
    .expect("Record semi 2 failed!");

    let rounds = bracket_rounds(db, &tournament_id).await;
    assert_eq!(rounds.len(), 4);

    let decider = rounds
        .iter()
        .find(|m| m.round == Some(MatchRound::Final))
        .expect("Final missing!");
    assert_eq!((decider.player_a, decider.player_b), (1, 3));
    let consolation = rounds
        .iter()
        .find(|m| m.round == Some(MatchRound::LittleFinal))
        .expect("Little final missing!");
    assert_eq!((consolation.player_a, consolation.player_b), (2, 4));

    // a duplicate completion notification must not duplicate the bracket
    record_match_result(
        db,
        semis[1].id,
        MatchOutcome {
            score_a: 1,
            score_b: 5,
            winner_id: 4,
        },
    )
    .await
    .expect("Duplicate completion must be swallowed!");

    let rounds = bracket_rounds(db, &tournament_id).await;
    assert_eq!(rounds.len(), 4);
    let unchanged = rounds
        .iter()
        .find(|m| m.round == Some(MatchRound::Semi2))
        .unwrap();
    assert_eq!(unchanged.winner_id, Some(3));
}

pub(super) async fn test_tournament_concludes(db: &DatabaseConnection) {
    let (tournament_id, semis) = start_tournament(db).await;

    record_match_result(
        db,
        semis[0].id,
        MatchOutcome {
            score_a: 5,
            score_b: 2,
            winner_id: 1,
        },
    )
    .await
    .unwrap();
    record_match_result(
        db,
        semis[1].id,
        MatchOutcome {
            score_a: 5,
            score_b: 4,
            winner_id: 3,
        },
    )
    .await
    .unwrap();

    let rounds = bracket_rounds(db, &tournament_id).await;
    let decider = rounds
        .iter()
        .find(|m| m.round == Some(MatchRound::Final))
        .unwrap();
    let consolation = rounds
        .iter()
        .find(|m| m.round == Some(MatchRound::LittleFinal))
        .unwrap();

    record_match_result(
        db,
        decider.id,
        MatchOutcome {
            score_a: 3,
            score_b: 5,
            winner_id: 3,
        },
    )
    .await
    .unwrap();
    record_match_result(
        db,
        consolation.id,
        MatchOutcome {
            score_a: 5,
            score_b: 1,
            winner_id: 2,
        },
    )
    .await
    .unwrap();

    let detail = get_tournament(db, &tournament_id)
        .await
        .expect("Detail lookup failed!");
    assert_eq!(detail.tournament.status, TournamentStatus::Finished);

    let standings: Vec<(i32, Option<i32>)> = detail
        .players
        .iter()
        .map(|p| (p.player_id, p.position))
        .collect();
    assert!(standings.contains(&(3, Some(1))));
    assert!(standings.contains(&(1, Some(2))));
    assert!(standings.contains(&(2, Some(3))));
    assert!(standings.contains(&(4, Some(4))));
}

pub(super) async fn test_match_to_play(db: &DatabaseConnection) {
    let (tournament_id, semis) = start_tournament(db).await;

    let pending = match_to_play(db, &tournament_id, 1)
        .await
        .expect("Player 1 must have a semifinal to play!");
    assert_eq!(pending.id, semis[0].id);

    // registered but not a participant
    let none = match_to_play(db, &tournament_id, 5).await;
    assert!(matches!(none, Err(AppError::NotFound(_))));

    record_match_result(
        db,
        semis[0].id,
        MatchOutcome {
            score_a: 5,
            score_b: 0,
            winner_id: 1,
        },
    )
    .await
    .unwrap();

    // semifinal resolved, final not generated yet: nothing to play
    let between_rounds = match_to_play(db, &tournament_id, 1).await;
    assert!(matches!(between_rounds, Err(AppError::NotFound(_))));

    record_match_result(
        db,
        semis[1].id,
        MatchOutcome {
            score_a: 5,
            score_b: 3,
            winner_id: 4,
        },
    )
    .await
    .unwrap();

    let decider = match_to_play(db, &tournament_id, 1)
        .await
        .expect("Winner must advance to the final!");
    assert_eq!(decider.round, Some(MatchRound::Final));
    assert_eq!((decider.player_a, decider.player_b), (1, 4));

    let consolation = match_to_play(db, &tournament_id, 2)
        .await
        .expect("Loser must drop to the consolation match!");
    assert_eq!(consolation.round, Some(MatchRound::LittleFinal));
    assert_eq!((consolation.player_a, consolation.player_b), (2, 3));
}
