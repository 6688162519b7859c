//! Value Objects - Immutable, identity-less domain primitives

mod remote_event_id;
mod task_id;
mod task_status;
mod user_id;

pub use remote_event_id::RemoteEventId;
pub use task_id::TaskId;
pub use task_status::TaskStatus;
pub use user_id::UserId;
