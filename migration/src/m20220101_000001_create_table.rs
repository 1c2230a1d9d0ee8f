use models::domains::{matches, players, tournament_players, tournaments};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(players::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(players::Column::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(players::Column::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(players::Column::Avatar).string().null())
                    .col(
                        ColumnDef::new(players::Column::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(tournaments::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(tournaments::Column::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(tournaments::Column::CreatedBy)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(tournaments::Column::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(tournaments::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tournament-created_by")
                            .from(tournaments::Entity, tournaments::Column::CreatedBy)
                            .to(players::Entity, players::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(tournament_players::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(tournament_players::Column::TournamentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(tournament_players::Column::PlayerId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(tournament_players::Column::Slot)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(tournament_players::Column::Position)
                            .integer()
                            .null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(tournament_players::Column::TournamentId)
                            .col(tournament_players::Column::PlayerId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tournament_player-tournament_id")
                            .from(
                                tournament_players::Entity,
                                tournament_players::Column::TournamentId,
                            )
                            .to(tournaments::Entity, tournaments::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tournament_player-player_id")
                            .from(
                                tournament_players::Entity,
                                tournament_players::Column::PlayerId,
                            )
                            .to(players::Entity, players::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // A slot number is handed out once per tournament.
        manager
            .create_index(
                Index::create()
                    .name("idx-tournament_player-slot")
                    .table(tournament_players::Entity)
                    .col(tournament_players::Column::TournamentId)
                    .col(tournament_players::Column::Slot)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(matches::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(matches::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(matches::Column::TournamentId)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(matches::Column::PlayerA).integer().not_null())
                    .col(ColumnDef::new(matches::Column::PlayerB).integer().not_null())
                    .col(ColumnDef::new(matches::Column::SessionId).string().null())
                    .col(
                        ColumnDef::new(matches::Column::ScoreA)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(matches::Column::ScoreB)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(matches::Column::WinnerId).integer().null())
                    .col(ColumnDef::new(matches::Column::Round).string_len(16).null())
                    .col(
                        ColumnDef::new(matches::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-match-tournament_id")
                            .from(matches::Entity, matches::Column::TournamentId)
                            .to(tournaments::Entity, tournaments::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Bracket generation guard: at most one match per (tournament, round).
        manager
            .create_index(
                Index::create()
                    .name("idx-match-tournament-round")
                    .table(matches::Entity)
                    .col(matches::Column::TournamentId)
                    .col(matches::Column::Round)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(matches::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(tournament_players::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(tournaments::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(players::Entity).to_owned())
            .await?;

        Ok(())
    }
}
