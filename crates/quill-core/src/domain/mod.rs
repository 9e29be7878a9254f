//! Domain entities - the core business objects.

mod content;
mod engagement;
mod identity;
mod post;

pub use content::{EXCERPT_LIMIT, UNCATEGORIZED, derive_excerpt, first_image_src, strip_markup};
pub use engagement::Engagement;
pub use identity::{EngagementIdentity, RequestContext, USER_AGENT_PREFIX_LEN};
pub use post::{Post, PostStatus};
