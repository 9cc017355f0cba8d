use std::sync::Arc;

use crate::config::BandmeterConfig;
use crate::storage::Pool;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub config: Arc<BandmeterConfig>,
}
