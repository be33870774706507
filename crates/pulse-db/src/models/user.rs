//! User database model (directory projection)

use sqlx::FromRow;

use pulse_core::traits::UserProfile;
use pulse_core::Snowflake;

/// Database model for the `users` table; only the columns the realtime
/// core needs
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
}

impl From<UserModel> for UserProfile {
    fn from(model: UserModel) -> Self {
        UserProfile {
            id: Snowflake::new(model.id),
            username: model.username,
        }
    }
}
