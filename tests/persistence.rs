use chrono::Utc;
use sea_orm::DatabaseConnection;

use app::persistence::players::upsert_player;
use utils::testing::setup_test_db;

#[path = "persistence/player.rs"]
mod player;
#[path = "persistence/tournament.rs"]
mod tournament;

async fn fresh_db() -> DatabaseConnection {
    setup_test_db("sqlite::memory:")
        .await
        .expect("Set up db failed!")
}

async fn seed_players(db: &DatabaseConnection, count: i32) {
    for id in 1..=count {
        upsert_player(db, id, &format!("player-{id}"), None, Utc::now())
            .await
            .expect("Seed player failed!");
    }
}

#[tokio::test]
async fn joining_twice_yields_one_membership_row() {
    let db = fresh_db().await;
    seed_players(&db, 4).await;
    tournament::test_join_idempotent(&db).await;
}

#[tokio::test]
async fn fourth_join_starts_the_tournament_and_seeds_semifinals() {
    let db = fresh_db().await;
    seed_players(&db, 4).await;
    tournament::test_fourth_join_starts(&db).await;
}

#[tokio::test]
async fn a_started_tournament_rejects_further_joins() {
    let db = fresh_db().await;
    seed_players(&db, 5).await;
    tournament::test_join_after_start_conflicts(&db).await;
}

#[tokio::test]
async fn final_rounds_are_generated_exactly_once() {
    let db = fresh_db().await;
    seed_players(&db, 4).await;
    tournament::test_bracket_generated_once(&db).await;
}

#[tokio::test]
async fn finished_finals_conclude_the_tournament_with_standings() {
    let db = fresh_db().await;
    seed_players(&db, 4).await;
    tournament::test_tournament_concludes(&db).await;
}

#[tokio::test]
async fn match_to_play_tracks_the_callers_pending_match() {
    let db = fresh_db().await;
    seed_players(&db, 5).await;
    tournament::test_match_to_play(&db).await;
}

#[tokio::test]
async fn unregistered_players_are_refused() {
    let db = fresh_db().await;
    seed_players(&db, 4).await;
    player::test_unregistered_player_is_refused(&db).await;
}

#[tokio::test]
async fn player_point_reads_work_by_id_and_username() {
    let db = fresh_db().await;
    seed_players(&db, 2).await;
    player::test_point_reads(&db).await;
}
