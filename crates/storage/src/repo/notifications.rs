use crate::{
    models::{SqlNotification, SqlNotificationDetail},
    Db,
};
use domain::{Notification, NotificationDetail, Username};

impl Db {
    pub async fn mark_notification_read(
        &self,
        notification_id: i64,
    ) -> anyhow::Result<Option<Notification>> {
        let row = sqlx::query_as::<_, SqlNotification>(
            r#"
            UPDATE notifications SET is_read = TRUE
            WHERE id = ?
            RETURNING id, target_user, comment_id, is_read
            "#,
        )
        .bind(notification_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn count_unread(&self, username: &Username) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE target_user = ? AND is_read = FALSE",
        )
        .bind(username.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // 未读通知，关联评论和帖子
    pub async fn list_unread_notifications(
        &self,
        username: &Username,
    ) -> anyhow::Result<Vec<NotificationDetail>> {
        let rows = sqlx::query_as::<_, SqlNotificationDetail>(
            r#"
            SELECT
                n.id,
                c.id AS comment_id,
                c.post_id,
                p.title AS post_title,
                c.body AS comment_body
            FROM notifications n
            JOIN comments c ON n.comment_id = c.id
            JOIN posts p ON c.post_id = p.id
            WHERE n.target_user = ? AND n.is_read = FALSE
            ORDER BY n.id ASC
            "#,
        )
        .bind(username.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::{comment, memory_db, post, user};

    #[tokio::test]
    async fn alice_reads_bobs_mention() {
        let db = memory_db().await;
        let p = post(&db, "alice", "Hello", "World").await;
        let c = comment(&db, p, 0, "bob", "@alice hi").await;

        let alice = user("alice");
        assert_eq!(db.count_unread(&alice).await.unwrap(), 1);

        let unread = db.list_unread_notifications(&alice).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].comment_id, c);
        assert_eq!(unread[0].post_id, p);
        assert_eq!(unread[0].label(), "Hello: @alice hi...");

        let read = db.mark_notification_read(unread[0].id).await.unwrap().unwrap();
        assert!(read.is_read);
        assert_eq!(read.comment_id, c);
        assert_eq!(db.count_unread(&alice).await.unwrap(), 0);
        assert!(db.list_unread_notifications(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_notification() {
        let db = memory_db().await;
        assert!(db.mark_notification_read(9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn roster_counts_unread() {
        let db = memory_db().await;
        let p = post(&db, "alice", "Hello", "World").await;
        comment(&db, p, 0, "bob", "@alice @carol ping").await;
        comment(&db, p, 0, "bob", "@alice again").await;
        db.upsert_user(&domain::ProfileUpdate::new(user("alice"), "Alice").unwrap(), None)
            .await
            .unwrap();
        db.upsert_user(&domain::ProfileUpdate::new(user("bob"), "Bob").unwrap(), None)
            .await
            .unwrap();

        let roster = db.list_users_with_unread().await.unwrap();
        let counts: Vec<(&str, i64)> = roster
            .iter()
            .map(|(u, n)| (u.username.as_str(), *n))
            .collect();
        assert_eq!(counts, vec![("alice", 2), ("bob", 0)]);
    }
}
