use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::MatchRound;

/// One bracket match. `session_id` points at the live session created for it;
/// the unique (tournament_id, round) index is the generation-once guard.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tournament_id: Option<String>,
    pub player_a: i32,
    pub player_b: i32,
    pub session_id: Option<String>,
    pub score_a: i32,
    pub score_b: i32,
    pub winner_id: Option<i32>,
    pub round: Option<MatchRound>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tournaments::Entity",
        from = "Column::TournamentId",
        to = "super::tournaments::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Tournaments,
}

impl Related<super::tournaments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tournaments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
