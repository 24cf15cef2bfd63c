use crate::{
    config::Config,
    websocket::{ConnectionRegistry, SessionRegistry},
};
use sqlx::{Pool, Postgres};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Postgres>,
    pub registry: ConnectionRegistry,
    pub sessions: SessionRegistry,
    pub config: Arc<Config>,
}
