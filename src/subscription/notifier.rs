use iced::{
    futures::{SinkExt, Stream},
    stream,
};
use log::trace;

use crate::session::{Notification, Notifier};

#[derive(Debug, Clone)]
pub enum Message {
    Ready(Notifier),
    Notification(Notification),
}

/// Relays session notifications raised on the playback thread.
pub fn subscription() -> impl Stream<Item = Message> {
    stream::channel(100, async |mut output| {
        let (notifier, notifications) = smol::channel::unbounded();
        if output.send(Message::Ready(notifier)).await.is_err() {
            return;
        }

        while let Ok(notification) = notifications.recv().await {
            trace!("Notifier: relaying {notification:?}");
            if output.send(Message::Notification(notification)).await.is_err() {
                break;
            }
        }
    })
}
