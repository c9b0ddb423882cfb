//! UNUserNotificationCenter wrapper.

use std::cell::RefCell;

use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::Bool;
use objc2_foundation::{NSArray, NSError, NSString};
use objc2_user_notifications::{
    UNAuthorizationOptions, UNNotificationRequest, UNUserNotificationCenter,
};
use tokio::sync::oneshot;

use crate::notification::error::NotificationError;

pub(super) struct NotificationCenter;

impl NotificationCenter {
    #[must_use]
    pub fn current() -> Retained<UNUserNotificationCenter> {
        UNUserNotificationCenter::currentNotificationCenter()
    }

    pub async fn request_authorization() -> Result<bool, NotificationError> {
        let (tx, rx) = oneshot::channel::<Result<bool, NotificationError>>();

        let options = UNAuthorizationOptions::Alert | UNAuthorizationOptions::Sound;

        let cb = RefCell::new(Some(tx));
        let block = RcBlock::new(move |granted: Bool, error: *mut NSError| {
            if let Some(sender) = cb.borrow_mut().take() {
                let result = match unsafe { error.as_ref() } {
                    Some(err) => Err(NotificationError::AuthorizationFailed(
                        err.localizedDescription().to_string(),
                    )),
                    None => Ok(granted.as_bool()),
                };
                let _ = sender.send(result);
            }
        });

        Self::current().requestAuthorizationWithOptions_completionHandler(options, &block);

        rx.await
            .map_err(|_| NotificationError::InitializationFailed("Channel closed".to_string()))?
    }

    pub async fn add_request(request: &UNNotificationRequest) -> Result<(), NotificationError> {
        let (tx, rx) = oneshot::channel::<Result<(), NotificationError>>();

        let cb = RefCell::new(Some(tx));
        let block = RcBlock::new(move |error: *mut NSError| {
            if let Some(sender) = cb.borrow_mut().take() {
                let result = match unsafe { error.as_ref() } {
                    Some(err) => Err(NotificationError::ScheduleFailed(
                        err.localizedDescription().to_string(),
                    )),
                    None => Ok(()),
                };
                let _ = sender.send(result);
            }
        });

        Self::current().addNotificationRequest_withCompletionHandler(request, Some(&block));

        rx.await
            .map_err(|_| NotificationError::ScheduleFailed("Channel closed".to_string()))?
    }

    /// Removes pending and delivered notifications with `identifier`.
    /// Unknown identifiers are ignored by the host.
    pub fn remove(identifier: &str) {
        let identifier = NSString::from_str(identifier);
        let identifiers: Retained<NSArray<NSString>> = NSArray::from_slice(&[&*identifier]);

        let center = Self::current();
        center.removePendingNotificationRequestsWithIdentifiers(&identifiers);
        center.removeDeliveredNotificationsWithIdentifiers(&identifiers);
    }

    pub fn remove_all() {
        let center = Self::current();
        center.removeAllPendingNotificationRequests();
        center.removeAllDeliveredNotifications();
    }
}
