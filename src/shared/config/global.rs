use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::shared::config::model::{Settings, load_settings};

/// Process-wide settings, loaded on first access. A malformed file or
/// environment override aborts; a missing file yields the defaults.
pub static CONFIG: Lazy<Arc<Settings>> = Lazy::new(|| {
    let settings =
        load_settings().unwrap_or_else(|e| panic!("invalid zftopn configuration: {}", e));
    debug!(target: "zftopn::config", ?settings, "Settings loaded");
    Arc::new(settings)
});
