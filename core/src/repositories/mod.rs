pub mod post;
pub mod session;
pub mod user;

pub use post::{PostEdit, PostRepository};
pub use session::SessionRepository;
pub use user::UserRepository;

#[cfg(any(test, feature = "testing"))]
pub use post::MockPostRepository;
#[cfg(any(test, feature = "testing"))]
pub use session::MockSessionRepository;
#[cfg(any(test, feature = "testing"))]
pub use user::MockUserRepository;
