use crate::domain::UserId;

/// An empty allowlist means the bot is open to everyone.
pub fn is_authorized(user_id: Option<UserId>, allowed_users: &[i64]) -> bool {
    let Some(user_id) = user_id else {
        return false;
    };
    if allowed_users.is_empty() {
        return true;
    }
    allowed_users.contains(&user_id.0)
}
