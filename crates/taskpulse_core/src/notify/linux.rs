use crate::advisor::{Notification, NotificationKind};
use crate::error::AppError;
use crate::notify::{APP_NAME, Notifier, headline};
use notify_rust::{Notification as DesktopNotification, Urgency};

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), AppError> {
        let urgency = match notification.kind {
            NotificationKind::Risk => Urgency::Critical,
            NotificationKind::Positive | NotificationKind::Suggestion => Urgency::Normal,
        };

        DesktopNotification::new()
            .appname(APP_NAME)
            .summary(&headline(notification.kind))
            .body(&notification.notification)
            .urgency(urgency)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;

        Ok(())
    }
}
