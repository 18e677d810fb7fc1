//! Migrations compiled into the binary. `axion make migration` writes new
//! units into this directory; add each one to `registry()` by hand.

mod m20250615062234_create_users_table;
mod m20250615062305_create_posts_table;
mod m20250615062331_add_avatar_to_users_table;
mod m20250615062714_create_categories_table;
mod m20250615063657_create_axion_settings_table;

use crate::migration::MigrationRegistry;

pub fn registry() -> MigrationRegistry {
    MigrationRegistry::new()
        .register(
            m20250615062234_create_users_table::NAME,
            m20250615062234_create_users_table::CreateUsersTable,
        )
        .register(
            m20250615062305_create_posts_table::NAME,
            m20250615062305_create_posts_table::CreatePostsTable,
        )
        .register(
            m20250615062331_add_avatar_to_users_table::NAME,
            m20250615062331_add_avatar_to_users_table::AddAvatarToUsersTable,
        )
        .register(
            m20250615062714_create_categories_table::NAME,
            m20250615062714_create_categories_table::CreateCategoriesTable,
        )
        .register(
            m20250615063657_create_axion_settings_table::NAME,
            m20250615063657_create_axion_settings_table::CreateAxionSettingsTable,
        )
}
