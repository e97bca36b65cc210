use crate::advisor::{Notification, NotificationKind};
use crate::error::AppError;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

const DISABLE_ENV: &str = "TASKPULSE_DISABLE_NOTIFICATIONS";
const APP_NAME: &str = "taskpulse";

pub trait Notifier {
    fn notify(&self, notification: &Notification) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: &Notification) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn notifier_from_env() -> Result<Box<dyn Notifier>, AppError> {
    if std::env::var(DISABLE_ENV).is_ok() {
        return Ok(Box::new(NoopNotifier));
    }

    match platform_notifier() {
        Ok(notifier) => Ok(notifier),
        Err(err) => match err {
            AppError::InvalidData(_) => Ok(Box::new(NoopNotifier)),
            other => Err(other),
        },
    }
}

/// Title line shown above the notification text.
pub fn headline(kind: NotificationKind) -> String {
    let label = match kind {
        NotificationKind::Risk => "Risk",
        NotificationKind::Positive => "Good news",
        NotificationKind::Suggestion => "Suggestion",
    };
    format!("{APP_NAME}: {label}")
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::{NoopNotifier, Notifier, headline};
    use crate::advisor::{Notification, NotificationKind};

    #[test]
    fn headline_names_the_kind() {
        assert_eq!(headline(NotificationKind::Risk), "taskpulse: Risk");
        assert_eq!(headline(NotificationKind::Positive), "taskpulse: Good news");
    }

    #[test]
    fn noop_notifier_accepts_everything() {
        let notification = Notification {
            notification: "All green.".to_string(),
            kind: NotificationKind::Positive,
        };
        assert!(NoopNotifier.notify(&notification).is_ok());
    }
}
