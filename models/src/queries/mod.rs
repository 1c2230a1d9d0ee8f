use serde::Deserialize;

#[derive(Deserialize, Default)]
pub struct PaginationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}
