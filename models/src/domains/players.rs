use sea_orm::entity::prelude::*;

/// Read-model of users owned by the auth service. Rows are written only by
/// the user event consumer; gameplay code treats this table as read-only.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub avatar: Option<String>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tournaments::Entity")]
    Tournaments,
    #[sea_orm(has_many = "super::tournament_players::Entity")]
    TournamentPlayers,
}

impl Related<super::tournaments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tournaments.def()
    }
}

impl Related<super::tournament_players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TournamentPlayers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
