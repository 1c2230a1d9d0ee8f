pub mod domains;
pub mod events;
pub mod params;
pub mod queries;
pub mod schemas;
