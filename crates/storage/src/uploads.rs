use anyhow::Context;
use domain::{Upload, Username};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "pdf"];
const DEFAULT_EXTENSION: &str = "png";

#[derive(Debug, Clone, Copy)]
pub enum AttachmentScope {
    Post,
    Comment,
}

impl AttachmentScope {
    fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Uploads {
    dir: PathBuf,
}

impl Uploads {
    pub async fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // {username}_icon.{ext}，覆盖旧头像
    pub async fn save_icon(&self, username: &Username, upload: &Upload) -> anyhow::Result<String> {
        let name = format!("{}_icon.{}", username, extension_of(upload));
        self.write(&name, &upload.bytes).await
    }

    // {username}_{post|comment}_{millis}.{ext}
    pub async fn save_attachment(
        &self,
        username: &Username,
        scope: AttachmentScope,
        upload: &Upload,
    ) -> anyhow::Result<String> {
        let stamp = chrono::Utc::now().timestamp_millis();
        let name = format!(
            "{}_{}_{}.{}",
            username,
            scope.as_str(),
            stamp,
            extension_of(upload)
        );
        self.write(&name, &upload.bytes).await
    }

    // 数据库写入失败时清理已保存的附件
    pub async fn remove(&self, name: &str) {
        let path = self.dir.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("Removed upload {}", path.display()),
            Err(e) => warn!("Failed to remove upload {}: {}", path.display(), e),
        }
    }

    // 返回相对于上传目录的文件名，由 HTTP 层挂载到 /uploads 下
    async fn write(&self, name: &str, bytes: &[u8]) -> anyhow::Result<String> {
        let path = self.dir.join(name);
        let mut file = tokio::fs::File::create(&path)
            .await
            .with_context(|| format!("Failed to create file {}", path.display()))?;
        file.write_all(bytes)
            .await
            .with_context(|| format!("Failed to write file {}", path.display()))?;
        file.flush().await?;
        debug!("Stored upload {} ({} bytes)", path.display(), bytes.len());
        Ok(name.to_string())
    }
}

fn extension_of(upload: &Upload) -> &'static str {
    let ext = upload
        .filename
        .as_deref()
        .and_then(|f| Path::new(f).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    ALLOWED_EXTENSIONS
        .iter()
        .find(|allowed| ext.as_deref() == Some(**allowed))
        .copied()
        .unwrap_or(DEFAULT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: Option<&str>) -> Upload {
        Upload {
            filename: name.map(str::to_string),
            bytes: b"fake image".to_vec(),
        }
    }

    #[tokio::test]
    async fn icon_path_is_derived_from_username() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = Uploads::new(tmp.path().join("uploads")).await.unwrap();
        let alice = Username::new("alice").unwrap();

        let name = uploads.save_icon(&alice, &upload(Some("me.JPG"))).await.unwrap();
        assert_eq!(name, "alice_icon.jpg");
        let stored = tokio::fs::read(uploads.dir().join(&name)).await.unwrap();
        assert_eq!(stored, b"fake image");
    }

    #[tokio::test]
    async fn attachment_names_follow_convention() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = Uploads::new(tmp.path()).await.unwrap();
        let bob = Username::new("bob").unwrap();

        let post = uploads
            .save_attachment(&bob, AttachmentScope::Post, &upload(Some("plan.pdf")))
            .await
            .unwrap();
        assert!(post.starts_with("bob_post_"));
        assert!(post.ends_with(".pdf"));

        let comment = uploads
            .save_attachment(&bob, AttachmentScope::Comment, &upload(Some("run.exe")))
            .await
            .unwrap();
        assert!(comment.starts_with("bob_comment_"));
        assert!(comment.ends_with(".png"));
    }

    #[tokio::test]
    async fn remove_deletes_stored_file() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = Uploads::new(tmp.path()).await.unwrap();
        let bob = Username::new("bob").unwrap();

        let name = uploads
            .save_attachment(&bob, AttachmentScope::Comment, &upload(None))
            .await
            .unwrap();
        uploads.remove(&name).await;
        assert!(!uploads.dir().join(&name).exists());

        // 文件已不存在时只记录日志
        uploads.remove(&name).await;
    }
}
