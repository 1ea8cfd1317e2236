use crate::application::ports::{Notification, NotificationLevel, Notifier};
use tokio::sync::broadcast;
use tracing::{error, info};

const NOTIFICATION_CAPACITY: usize = 32;

/// 通知をトレースに記録し、購読中の UI へ配信する
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Notification>,
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                info!("{}: {}", notification.title, notification.description)
            }
            NotificationLevel::Error => {
                error!("{}: {}", notification.title, notification.description)
            }
        }
        // 表示先が無ければ捨てる
        let _ = self.sender.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_notifications() {
        let notifier = BroadcastNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.notify(Notification::error("Update failed", "offline"));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.level, NotificationLevel::Error);
        assert_eq!(received.description, "offline");
    }

    #[test]
    fn test_notify_without_subscribers_is_silent() {
        BroadcastNotifier::new().notify(Notification::success("Saved", "ok"));
    }
}
