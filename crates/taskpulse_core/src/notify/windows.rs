use crate::advisor::Notification;
use crate::error::AppError;
use crate::notify::{Notifier, headline};
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(&headline(notification.kind))
            .text1(&notification.notification)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
