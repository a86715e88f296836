/// Allocate an opaque match identifier
pub fn new_match_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Allocate an identifier not already known to `exists`
pub fn new_unique_match_id<F>(exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    loop {
        let id = new_match_id();
        if !exists(&id) {
            return id;
        }
    }
}
