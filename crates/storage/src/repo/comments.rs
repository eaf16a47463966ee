use crate::{models::SqlComment, now_to_minute, Db};
use domain::{mention::notification_targets, Comment, NewComment, Notification, Username};

const COMMENT_COLUMNS: &str = "id, post_id, parent_id, author, body, attachment, created_at";

impl Db {
    // 评论和通知在同一事务中写入。通知对象：父评论作者和被 @ 的用户，不含评论者本人
    pub async fn create_comment(
        &self,
        c: NewComment,
    ) -> anyhow::Result<(Comment, Vec<Notification>)> {
        let created_at = now_to_minute();
        // 事务必须以写语句开头，父评论在事务外查询
        let parent_author: Option<String> = if c.parent_id != 0 {
            sqlx::query_scalar("SELECT author FROM comments WHERE id = ? AND post_id = ?")
                .bind(c.parent_id)
                .bind(c.post_id)
                .fetch_optional(&self.pool)
                .await?
        } else {
            None
        };
        if c.parent_id != 0 && parent_author.is_none() {
            anyhow::bail!(
                "parent comment {} not found in post {}",
                c.parent_id,
                c.post_id
            );
        }

        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            r#"
            INSERT INTO comments (post_id, parent_id, author, body, attachment, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(c.post_id)
        .bind(c.parent_id)
        .bind(c.author.as_str())
        .bind(&c.body)
        .bind(&c.attachment)
        .bind(created_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let parent_author = parent_author.map(Username::new_unchecked);
        let targets = notification_targets(&c.author, parent_author.as_ref(), &c.body);

        let mut notifications = Vec::with_capacity(targets.len());
        for target in targets {
            let notification_id =
                sqlx::query("INSERT INTO notifications (target_user, comment_id) VALUES (?, ?)")
                    .bind(target.as_str())
                    .bind(id)
                    .execute(&mut *tx)
                    .await?
                    .last_insert_rowid();
            notifications.push(Notification {
                id: notification_id,
                target_user: target,
                comment_id: id,
                is_read: false,
            });
        }

        tx.commit().await?;

        let comment = Comment {
            id,
            post_id: c.post_id,
            parent_id: c.parent_id,
            author: c.author,
            body: c.body,
            attachment: c.attachment,
            created_at,
        };
        Ok((comment, notifications))
    }

    pub async fn get_comment(&self, comment_id: i64) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, SqlComment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?"
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn list_comments(
        &self,
        post_id: i64,
        parent_id: i64,
    ) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, SqlComment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ? AND parent_id = ? ORDER BY id ASC"
        ))
        .bind(post_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_post_comments(&self, post_id: i64) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, SqlComment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ? ORDER BY id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    // 递归删除整棵回复子树及相关通知，返回被删 id（自身在前）
    pub async fn delete_comment(&self, comment_id: i64) -> anyhow::Result<Vec<i64>> {
        let mut tx = self.pool.begin().await?;

        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            WITH RECURSIVE subtree(id) AS (
                SELECT id FROM comments WHERE id = ?
                UNION ALL
                SELECT c.id FROM comments c JOIN subtree s ON c.parent_id = s.id
            )
            SELECT id FROM subtree ORDER BY id ASC
            "#,
        )
        .bind(comment_id)
        .fetch_all(&mut *tx)
        .await?;

        if ids.is_empty() {
            return Ok(ids);
        }

        for id in &ids {
            sqlx::query("DELETE FROM notifications WHERE comment_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM comments WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(ids)
    }
}
