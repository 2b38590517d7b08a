//! Main post service implementation

use std::sync::Arc;

use sigma_shared::Pagination;
use uuid::Uuid;

use crate::domain::entities::{NewPost, Post, PostChanges};
use crate::domain::value_objects::{ImageRef, SearchFilter};
use crate::errors::{AuthError, DomainError, DomainResult, PostError};
use crate::repositories::{PostEdit, PostRepository, UserRepository};
use crate::validation::post::check_post;

/// Service for publishing, editing and finding posts
pub struct PostService<P, U>
where
    P: PostRepository,
    U: UserRepository,
{
    post_repository: Arc<P>,
    user_repository: Arc<U>,
}

impl<P, U> PostService<P, U>
where
    P: PostRepository,
    U: UserRepository,
{
    pub fn new(post_repository: Arc<P>, user_repository: Arc<U>) -> Self {
        Self {
            post_repository,
            user_repository,
        }
    }

    /// Publish a post for `user_id`
    ///
    /// # Returns
    ///
    /// * `Ok(Post)` - The stored post
    /// * `Err(DomainError::FileTooLarge)` - An image exceeds 5MB, with its index
    /// * `Err(PostError::MaxPostLength)` - Clients may own 1 post, agents 35
    pub async fn create(&self, user_id: Uuid, data: NewPost) -> DomainResult<Post> {
        check_image_sizes(&data.images)?;

        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let post = self
            .post_repository
            .create(Post::new(user.id, data), user.max_posts())
            .await?;

        tracing::info!(
            post_id = %post.id,
            user_id = %user_id,
            post_type = %post.post_type(),
            event = "post_created",
            "Post published"
        );
        Ok(post)
    }

    /// Apply a partial update to a post owned by `user_id`
    ///
    /// The merged post must still hold 1 to 10 images and, for exchanges, one
    /// offer per property. The merge runs against the locked, current post.
    pub async fn update(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        changes: PostChanges,
    ) -> DomainResult<Post> {
        check_image_sizes(&changes.new_images)?;

        let edit: PostEdit = Box::new(move |post: &mut Post| {
            if !post.is_authored_by(user_id) {
                return Err(PostError::NotAuthor.into());
            }
            let removed = post
                .apply_changes(changes)
                .ok_or(PostError::TypeMismatch)?;
            check_post(post)?;
            tracing::debug!(post_id = %post.id, removed_images = removed.len(), "Post merged");
            Ok(())
        });
        let post = self.post_repository.update(post_id, edit).await?;

        tracing::info!(post_id = %post.id, event = "post_updated", "Post updated");
        Ok(post)
    }

    pub async fn delete(&self, user_id: Uuid, post_id: Uuid) -> DomainResult<()> {
        self.owned_post(user_id, post_id).await?;
        if !self.post_repository.delete(post_id).await? {
            return Err(PostError::NotFound.into());
        }

        tracing::info!(post_id = %post_id, event = "post_deleted", "Post deleted");
        Ok(())
    }

    /// A single post, public
    pub async fn get(&self, post_id: Uuid) -> DomainResult<Post> {
        self.post_repository
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| PostError::NotFound.into())
    }

    /// Posts of `user_id`, newest first
    pub async fn list(&self, user_id: Uuid) -> DomainResult<Vec<Post>> {
        self.post_repository.find_by_author(user_id).await
    }

    /// One page of posts matching `filter`, newest first
    pub async fn search(
        &self,
        filter: &SearchFilter,
        pagination: Pagination,
    ) -> DomainResult<Vec<Post>> {
        self.post_repository.search(filter, pagination).await
    }

    async fn owned_post(&self, user_id: Uuid, post_id: Uuid) -> DomainResult<Post> {
        let post = self.get(post_id).await?;
        if !post.is_authored_by(user_id) {
            return Err(PostError::NotAuthor.into());
        }
        Ok(post)
    }
}

fn check_image_sizes(images: &[ImageRef]) -> DomainResult<()> {
    match images.iter().position(ImageRef::exceeds_max_size) {
        Some(index) => Err(DomainError::FileTooLarge { index: Some(index) }),
        None => Ok(()),
    }
}
