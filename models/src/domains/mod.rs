pub mod matches;
pub mod players;
pub mod sea_orm_active_enums;
pub mod tournament_players;
pub mod tournaments;

pub use matches::Entity as Matches;
pub use players::Entity as Players;
pub use tournament_players::Entity as TournamentPlayers;
pub use tournaments::Entity as Tournaments;
