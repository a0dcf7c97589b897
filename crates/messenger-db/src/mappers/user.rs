//! User entity <-> model mapper

use messenger_core::entities::User;
use messenger_core::value_objects::Snowflake;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            external_id: model.external_id,
            name: model.name,
            email: model.email,
            avatar: model.avatar,
            is_online: model.is_online,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
