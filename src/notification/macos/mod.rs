//! macOS notification backend.
//!
//! Displays the cooking notification through `UNUserNotificationCenter`.
//! The notification handle doubles as the request identifier, so a cancel
//! can target a notification whether it is still pending or delivered.

mod center;

use objc2::rc::Retained;
use objc2_foundation::NSString;
use objc2_user_notifications::{
    UNMutableNotificationContent, UNNotificationInterruptionLevel, UNNotificationRequest,
    UNNotificationSound,
};

use self::center::NotificationCenter;
use super::{
    NotificationCapability, NotificationContent, NotificationError, NotificationHandle,
    NotificationRequest, UrgencyTier,
};

/// System notification capability backed by `UNUserNotificationCenter`.
#[derive(Debug, Default)]
pub struct SystemNotifier;

impl SystemNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn interruption_level(tier: UrgencyTier) -> UNNotificationInterruptionLevel {
    match tier {
        UrgencyTier::Normal => UNNotificationInterruptionLevel::Passive,
        UrgencyTier::High => UNNotificationInterruptionLevel::Active,
        UrgencyTier::Max => UNNotificationInterruptionLevel::TimeSensitive,
    }
}

fn build_content(content: &NotificationContent) -> Retained<UNMutableNotificationContent> {
    let native = unsafe { UNMutableNotificationContent::new() };
    unsafe {
        native.setTitle(&NSString::from_str(&content.title));
        native.setBody(&NSString::from_str(&content.body));
        native.setCategoryIdentifier(&NSString::from_str(content.kind.category_id()));
        native.setInterruptionLevel(interruption_level(content.priority));
        if content.sound {
            native.setSound(Some(&UNNotificationSound::defaultSound()));
        }
    }
    native
}

impl NotificationCapability for SystemNotifier {
    async fn initialize(&self) -> Result<(), NotificationError> {
        if NotificationCenter::request_authorization().await? {
            tracing::debug!("notification permission granted");
            Ok(())
        } else {
            Err(NotificationError::PermissionDenied)
        }
    }

    async fn schedule(&self, request: &NotificationRequest) -> Result<(), NotificationError> {
        let identifier = NSString::from_str(&request.handle.to_string());
        let content = build_content(&request.content);
        let native =
            UNNotificationRequest::requestWithIdentifier_content_trigger(&identifier, &content, None);

        NotificationCenter::add_request(&native).await
    }

    async fn cancel(&self, handle: NotificationHandle) -> Result<(), NotificationError> {
        NotificationCenter::remove(&handle.to_string());
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), NotificationError> {
        NotificationCenter::remove_all();
        Ok(())
    }
}
