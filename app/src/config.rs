use std::{ops::Deref, sync::Arc};

pub struct ConfigInner {
    pub db_url: String,
    pub host: String,
    pub port: u16,
    pub allowed_origin: String,
    pub redis_url: String,
    pub user_stream: String,
    pub consumer_group: String,
    pub consumer_name: String,
}

#[derive(Clone)]
pub struct Config(Arc<ConfigInner>);

impl Config {
    pub fn from_env() -> Config {
        dotenvy::dotenv().ok();

        let v = ConfigInner {
            db_url: std::env::var("DATABASE_URL").expect("DATABASE_URL is not set in .env file"),
            host: std::env::var("HOST").expect("HOST is not set in .env file"),
            port: std::env::var("PORT")
                .expect("PORT is not set in .env file")
                .parse()
                .expect("PORT is not a number"),
            allowed_origin: std::env::var("ALLOWED_ORIGIN")
                .expect("ALLOWED_ORIGIN is not set in .env file"),
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL is not set in .env file"),
            user_stream: std::env::var("USER_EVENT_STREAM").unwrap_or_else(|_| "user-events".into()),
            consumer_group: std::env::var("USER_EVENT_GROUP").unwrap_or_else(|_| "game".into()),
            consumer_name: std::env::var("USER_EVENT_CONSUMER")
                .unwrap_or_else(|_| format!("game-{}", std::process::id())),
        };

        Self(Arc::new(v))
    }

    pub fn get_server_url(&self) -> String {
        format!("{}:{}", self.0.host, self.0.port)
    }
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
