//! Post repository trait: listings with their detail, property and image
//! rows, plus search.

use async_trait::async_trait;
use sigma_shared::Pagination;
use uuid::Uuid;

use crate::domain::entities::Post;
use crate::domain::value_objects::SearchFilter;
use crate::errors::DomainError;

/// Edit applied to a locked post; an error leaves the post untouched
pub type PostEdit = Box<dyn FnOnce(&mut Post) -> Result<(), DomainError> + Send>;

/// Repository trait for post persistence operations
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Store a post unless its author already owns `max_posts` posts.
    ///
    /// The count and the inserts run in one transaction.
    ///
    /// # Returns
    /// * `Ok(Post)` - The stored post
    /// * `Err(PostError::MaxPostLength)` - The author reached the cap
    async fn create(&self, post: Post, max_posts: usize) -> Result<Post, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;

    /// Posts of one author, newest first
    async fn find_by_author(&self, user_id: Uuid) -> Result<Vec<Post>, DomainError>;

    /// Read post `id`, apply `edit` and rewrite the post with all of its
    /// child rows.
    ///
    /// The read and the write run in one transaction holding the post lock,
    /// so concurrent edits of one post apply one after another.
    ///
    /// # Returns
    /// * `Ok(Post)` - The stored post
    /// * `Err(PostError::NotFound)` - No such post
    /// * `Err(_)` - The error returned by `edit`
    async fn update(&self, id: Uuid, edit: PostEdit) -> Result<Post, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// One page of posts matching `filter`, newest first
    async fn search(
        &self,
        filter: &SearchFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;
}
