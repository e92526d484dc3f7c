use crate::session::PrincipalId;

/// Returns the cache key for a principal's event collection.
pub fn events_key(principal: &PrincipalId) -> String {
    format!("events:{}", principal)
}
