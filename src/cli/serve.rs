use std::sync::Arc;

use crate::api::{self, AppState};
use crate::error::Result;

pub fn run(bind: Option<String>) -> Result<()> {
    let (settings, store) = super::open_default_store()?;
    let addr = bind.unwrap_or_else(|| settings.bind_addr.clone());
    let state = AppState {
        store: Arc::new(store),
        archive_prefix: Arc::from(settings.archive_prefix.as_str()),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(api::serve(state, &addr))
}
