pub fn session_key(user_id: &str) -> String {
    format!("session:{}", user_id)
}
