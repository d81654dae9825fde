//! Queries for the admin-owned template catalog in the workspace store.

use sqlx::PgPool;

use crate::models::workspace::AdminTemplateRow;

/// Reads the shared template catalog. Templates are the flows owned by the
/// designated template-admin account.
pub struct CatalogRepo;

impl CatalogRepo {
    /// All templates owned by `admin_username`, ordered by (folder name,
    /// template name) so repeated reads iterate in a stable order and sync
    /// reports are reproducible.
    pub async fn list_admin_templates(
        pool: &PgPool,
        admin_username: &str,
    ) -> Result<Vec<AdminTemplateRow>, sqlx::Error> {
        sqlx::query_as::<_, AdminTemplateRow>(
            r#"SELECT
                   f.id, f.name, f.data, f.description, f.updated_at,
                   fol.name AS folder_name
               FROM flow f
               JOIN "user" u ON f.user_id = u.id
               LEFT JOIN folder fol ON f.folder_id = fol.id
               WHERE u.username = $1
               ORDER BY fol.name, f.name"#,
        )
        .bind(admin_username)
        .fetch_all(pool)
        .await
    }
}
