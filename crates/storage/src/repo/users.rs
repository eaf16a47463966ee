use crate::{
    models::{SqlRosterUser, SqlUser},
    now_to_second, Db,
};
use chrono::NaiveDateTime;
use domain::{ProfileUpdate, User, Username};

impl Db {
    // 保存个人资料：同时刷新 last_active。未上传新头像时保留原头像
    pub async fn upsert_user(
        &self,
        profile: &ProfileUpdate,
        icon: Option<&str>,
    ) -> anyhow::Result<User> {
        let now = now_to_second();

        let row = sqlx::query_as::<_, SqlUser>(
            r#"
            INSERT INTO users (username, display_name, icon, last_active)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(username) DO UPDATE SET
                display_name = excluded.display_name,
                icon = COALESCE(excluded.icon, users.icon),
                last_active = excluded.last_active
            RETURNING username, display_name, icon, last_active
            "#,
        )
        .bind(profile.username.as_str())
        .bind(&profile.display_name)
        .bind(icon)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    // 刷新 last_active，返回旧值；用户不存在时返回 None 且不写入
    pub async fn touch_user_activity(
        &self,
        username: &Username,
    ) -> anyhow::Result<Option<NaiveDateTime>> {
        // 读写分开执行，不放进同一个事务
        let previous: Option<NaiveDateTime> =
            sqlx::query_scalar("SELECT last_active FROM users WHERE username = ?")
                .bind(username.as_str())
                .fetch_optional(&self.pool)
                .await?;

        if previous.is_some() {
            sqlx::query("UPDATE users SET last_active = ? WHERE username = ?")
                .bind(now_to_second())
                .bind(username.as_str())
                .execute(&self.pool)
                .await?;
        }

        Ok(previous)
    }

    #[cfg(test)]
    pub async fn get_user(&self, username: &Username) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, SqlUser>(
            "SELECT username, display_name, icon, last_active FROM users WHERE username = ?",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    // 按注册顺序列出用户及其未读数
    pub async fn list_users_with_unread(&self) -> anyhow::Result<Vec<(User, i64)>> {
        let rows = sqlx::query_as::<_, SqlRosterUser>(
            r#"
            SELECT
                u.username,
                u.display_name,
                u.icon,
                u.last_active,
                (SELECT COUNT(*) FROM notifications n
                 WHERE n.target_user = u.username AND n.is_read = FALSE) AS unread
            FROM users u
            ORDER BY u.rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| (r.user.into(), r.unread))
            .collect())
    }
}
