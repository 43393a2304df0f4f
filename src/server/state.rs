use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};

use super::{
    session::{session_ttl, SessionStore},
    users::UserStore,
};
use crate::config::Config;

pub struct State {
    pub users: UserStore,
    pub sessions: SessionStore,
    pub upload_dir: PathBuf,
    pub bcrypt_cost: u32,
}

impl State {
    pub async fn new(config: &Config) -> Result<Arc<Self>> {
        let path = config.data_dir.join("users.json");
        let users = UserStore::open(&path)
            .await
            .with_context(|| format!("Failed to open user collection {}", path.display()))?;

        Ok(Arc::new(Self {
            users,
            sessions: SessionStore::new(session_ttl()),
            upload_dir: config.upload_dir.clone(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }))
    }
}
