use crate::{models::SqlPost, now_to_minute, Db};
use domain::{NewPost, Post, PostFilter};
use sqlx::{QueryBuilder, Sqlite};

impl Db {
    pub async fn create_post(&self, p: NewPost) -> anyhow::Result<Post> {
        let created_at = now_to_minute();

        let id = sqlx::query(
            r#"
            INSERT INTO posts (title, body, author, category, attachment, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&p.title)
        .bind(&p.body)
        .bind(p.author.as_str())
        .bind(&p.category)
        .bind(&p.attachment)
        .bind(created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(Post {
            id,
            title: p.title,
            body: p.body,
            author: p.author,
            category: p.category,
            attachment: p.attachment,
            created_at,
        })
    }

    pub async fn get_post(&self, post_id: i64) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query_as::<_, SqlPost>(
            r#"
            SELECT id, title, body, author, category, attachment, created_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    // 搜索条件：标题或正文包含关键字（不区分大小写），且分类完全匹配
    pub async fn list_posts(&self, filter: &PostFilter) -> anyhow::Result<Vec<Post>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, title, body, author, category, attachment, created_at FROM posts WHERE 1 = 1",
        );

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", escape_like(search));
            qb.push(" AND (title LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR body LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        if let Some(category) = &filter.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
        qb.push(" ORDER BY id DESC");

        let rows = qb
            .build_query_as::<SqlPost>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    // 删除帖子及其评论和通知。帖子不存在时返回 None
    pub async fn delete_post(&self, post_id: i64) -> anyhow::Result<Option<Vec<i64>>> {
        let mut tx = self.pool.begin().await?;

        let comment_ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM comments WHERE post_id = ? ORDER BY id ASC")
                .bind(post_id)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query(
            "DELETE FROM notifications WHERE comment_id IN (SELECT id FROM comments WHERE post_id = ?)",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            return Ok(None);
        }
        tx.commit().await?;
        Ok(Some(comment_ids))
    }
}

// LIKE 通配符转义，保证按字面子串匹配
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
