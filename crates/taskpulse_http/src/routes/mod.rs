pub mod ai;
pub mod burndown;
pub mod directives;
pub mod meetings;
pub mod session;
pub mod tasks;
pub mod users;
pub mod vision;

use serde::Serialize;

#[derive(Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new<M: Into<String>>(message: M) -> Self {
        Self {
            message: message.into(),
        }
    }
}
