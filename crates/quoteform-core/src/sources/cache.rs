use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::QuoteError;
use crate::hierarchy::FieldPathMapping;
use crate::sources::field_order::load_field_order;

struct CachedOrder {
    path: PathBuf,
    mapping: Arc<FieldPathMapping>,
}

/// Field order of the current session. Holds one source at a time.
static FIELD_ORDER: RwLock<Option<CachedOrder>> = RwLock::new(None);

/// Field order for `path`, loaded on first use and shared afterwards.
/// Asking for a different path replaces the cached one.
pub fn cached_field_order(path: &Path) -> Result<Arc<FieldPathMapping>, QuoteError> {
    {
        let cached = FIELD_ORDER.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(c) = cached.as_ref().filter(|c| c.path == path) {
            return Ok(Arc::clone(&c.mapping));
        }
    }

    let mapping = Arc::new(load_field_order(path)?);
    let mut cached = FIELD_ORDER.write().unwrap_or_else(PoisonError::into_inner);
    *cached = Some(CachedOrder {
        path: path.to_path_buf(),
        mapping: Arc::clone(&mapping),
    });
    debug!(path = %path.display(), "cached field order");
    Ok(mapping)
}

/// Drop the cached field order; the next call reloads from disk.
pub fn invalidate_field_order() {
    let mut cached = FIELD_ORDER.write().unwrap_or_else(PoisonError::into_inner);
    *cached = None;
}
