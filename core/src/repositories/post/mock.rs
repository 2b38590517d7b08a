//! Mock implementation of PostRepository for testing

use async_trait::async_trait;
use sigma_shared::Pagination;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::Post;
use crate::domain::value_objects::SearchFilter;
use crate::errors::{DomainError, PostError};

use super::trait_::{PostEdit, PostRepository};

/// Mock post repository for testing
#[derive(Clone, Default)]
pub struct MockPostRepository {
    posts: Arc<RwLock<HashMap<Uuid, Post>>>,
}

impl MockPostRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn post_count(&self) -> usize {
        self.posts.read().await.len()
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

#[async_trait]
impl PostRepository for MockPostRepository {
    async fn create(&self, post: Post, max_posts: usize) -> Result<Post, DomainError> {
        let mut posts = self.posts.write().await;

        let owned = posts.values().filter(|p| p.user_id == post.user_id).count();
        if owned >= max_posts {
            return Err(PostError::MaxPostLength { limit: max_posts }.into());
        }

        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn find_by_author(&self, user_id: Uuid) -> Result<Vec<Post>, DomainError> {
        let posts = self.posts.read().await;
        Ok(newest_first(
            posts.values().filter(|p| p.user_id == user_id).cloned().collect(),
        ))
    }

    async fn update(&self, id: Uuid, edit: PostEdit) -> Result<Post, DomainError> {
        let mut posts = self.posts.write().await;
        let mut post = posts.get(&id).cloned().ok_or(PostError::NotFound)?;
        edit(&mut post)?;
        posts.insert(id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }

    async fn search(
        &self,
        filter: &SearchFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let posts = self.posts.read().await;
        let matching = newest_first(posts.values().filter(|p| filter.matches(p)).cloned().collect());
        Ok(matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect())
    }
}
