mod burndown;
mod directive;
mod meeting;
mod task;
pub mod timestamp;
mod user;
mod vision;

pub use burndown::BurndownPoint;
pub use directive::AiDirective;
pub use meeting::{ActionItem, Meeting, MeetingPatch, NewMeeting};
pub use task::{NewTask, Priority, TASK_ID_PREFIX, Task, TaskPatch, TaskStatus};
pub use user::{NewUser, User, UserPatch};
pub use vision::ProjectVision;
