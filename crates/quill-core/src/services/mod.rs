//! Services - the operations Quill exposes to its callers.

mod authoring;
mod engagement;
mod ingestion;
mod locks;
mod scheduler;

pub use authoring::{NewPost, PostAuthoring, PostEdit, PostView};
pub use engagement::{EngagementConfig, EngagementTracker};
pub use ingestion::{CoverRepairReport, FeedIngestion, IngestionConfig, SyncReport};
pub use scheduler::{PublicationScheduler, PublishReport};
