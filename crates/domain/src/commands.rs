use crate::error::ValidationError;
use crate::models::{Username, DEFAULT_CATEGORY};

#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub author: Username,
    pub category: String,
    pub attachment: Option<String>,
}

impl NewPost {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        author: Username,
        category: Option<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        let body = body.into();
        if title.trim().is_empty() {
            return Err(ValidationError::Empty("title"));
        }
        if body.trim().is_empty() {
            return Err(ValidationError::Empty("body"));
        }
        let category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        Ok(Self {
            title,
            body,
            author,
            category,
            attachment: None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub parent_id: i64,
    pub author: Username,
    pub body: String,
    pub attachment: Option<String>,
}

impl NewComment {
    pub fn new(
        post_id: i64,
        parent_id: i64,
        author: Username,
        body: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(ValidationError::Empty("body"));
        }
        Ok(Self {
            post_id,
            parent_id: parent_id.max(0),
            author,
            body,
            attachment: None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub username: Username,
    pub display_name: String,
}

impl ProfileUpdate {
    pub fn new(
        username: Username,
        display_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(ValidationError::Empty("display_name"));
        }
        Ok(Self {
            username,
            display_name,
        })
    }
}

// 空字符串视为不过滤
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl PostFilter {
    pub fn new(search: Option<String>, category: Option<String>) -> Self {
        Self {
            search: search.filter(|s| !s.is_empty()),
            category: category.filter(|c| !c.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Username {
        Username::new("alice").unwrap()
    }

    #[test]
    fn new_post_requires_title_and_body() {
        assert_eq!(
            NewPost::new("", "World", alice(), None).unwrap_err(),
            ValidationError::Empty("title")
        );
        assert_eq!(
            NewPost::new("Hello", "  ", alice(), None).unwrap_err(),
            ValidationError::Empty("body")
        );
    }

    #[test]
    fn new_post_defaults_category() {
        let post = NewPost::new("Hello", "World", alice(), Some("   ".into())).unwrap();
        assert_eq!(post.category, DEFAULT_CATEGORY);
        let post = NewPost::new("Hello", "World", alice(), Some("news".into())).unwrap();
        assert_eq!(post.category, "news");
    }

    #[test]
    fn empty_filters_are_dropped() {
        let f = PostFilter::new(Some(String::new()), Some("news".into()));
        assert!(f.search.is_none());
        assert_eq!(f.category.as_deref(), Some("news"));
    }
}
