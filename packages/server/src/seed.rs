use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::info;

use crate::config::BootstrapConfig;
use crate::entity::role::Role;
use crate::entity::user;
use crate::utils::hash;

/// Create the bootstrap admin account unless a user with that name exists.
///
/// Returns `true` when the account was created by this call.
pub async fn seed_admin<C: ConnectionTrait>(
    db: &C,
    bootstrap: &BootstrapConfig,
) -> anyhow::Result<bool> {
    let username = bootstrap.admin_username.trim();

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    let password_hash = hash::hash_password(&bootstrap.admin_password)?;

    let model = user::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password_hash),
        role: Set(Role::Admin),
        ..Default::default()
    };

    // Another instance may have seeded the account since the lookup.
    let result = user::Entity::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => Ok(false),
        Ok(_) => {
            info!(username, "Seeded default admin account");
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}
