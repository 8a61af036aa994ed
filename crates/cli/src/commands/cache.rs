//! Response cache maintenance.

use mobile_shop_storefront::error::AppError;
use mobile_shop_storefront::state::AppState;

/// Drop every cached catalog response.
///
/// # Errors
///
/// Returns an error if the cache blob cannot be removed.
#[allow(clippy::print_stdout)]
pub fn clear(state: &AppState) -> Result<(), AppError> {
    let cache = state.catalog().cache();
    let entries = cache.len();
    cache.clear()?;

    tracing::info!(entries, "Response cache cleared");
    println!("Cleared {entries} cached response(s).");
    Ok(())
}
