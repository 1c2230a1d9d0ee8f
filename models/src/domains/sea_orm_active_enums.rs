use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TournamentStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "STARTED")]
    Started,
    #[sea_orm(string_value = "FINISHED")]
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum MatchRound {
    #[sea_orm(string_value = "SEMI_1")]
    #[serde(rename = "SEMI_1")]
    Semi1,
    #[sea_orm(string_value = "SEMI_2")]
    #[serde(rename = "SEMI_2")]
    Semi2,
    #[sea_orm(string_value = "LITTLE_FINAL")]
    #[serde(rename = "LITTLE_FINAL")]
    LittleFinal,
    #[sea_orm(string_value = "FINAL")]
    #[serde(rename = "FINAL")]
    Final,
}
