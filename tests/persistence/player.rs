use sea_orm::DatabaseConnection;

use app::error::AppError;
use app::persistence::players::{get_player, get_player_by_username};
use app::persistence::tournaments::{create_tournament, join_tournament};
use models::schemas::player::Principal;

pub(super) async fn test_unregistered_player_is_refused(db: &DatabaseConnection) {
    let ghost = Principal {
        id: 99,
        username: "ghost".into(),
    };

    let refused = create_tournament(db, &ghost).await;
    assert!(matches!(refused, Err(AppError::NotFound(_))));

    let creator = Principal {
        id: 1,
        username: "player-1".into(),
    };
    let tournament = create_tournament(db, &creator)
        .await
        .expect("Create tournament failed!");

    let refused = join_tournament(db, &ghost, &tournament.id).await;
    assert!(matches!(refused, Err(AppError::NotFound(_))));
}

pub(super) async fn test_point_reads(db: &DatabaseConnection) {
    let by_id = get_player(db, 1)
        .await
        .expect("Lookup failed!")
        .expect("Player 1 must exist!");
    assert_eq!(by_id.username, "player-1");

    let by_username = get_player_by_username(db, "player-2")
        .await
        .expect("Lookup failed!")
        .expect("Player 2 must exist!");
    assert_eq!(by_username.id, 2);

    assert!(get_player(db, 42).await.expect("Lookup failed!").is_none());
}
