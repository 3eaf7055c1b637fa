//! Global keyboard hook, alive for as long as the window subscribes to it.
//!
//! `rdev::listen` never returns while the hook is installed, so it gets its
//! own thread and relays through a channel.

use iced::{
    futures::{SinkExt, Stream},
    stream,
};
use log::{debug, error, info};

use crate::{capture::ObservedKey, error::HostError};

#[derive(Debug, Clone)]
pub enum Message {
    Key(ObservedKey),
    Failed(HostError),
}

pub fn subscription() -> impl Stream<Item = Message> {
    stream::channel(100, async |mut output| {
        let (hook_tx, hook_rx) = smol::channel::unbounded::<Message>();

        let spawned = std::thread::Builder::new()
            .name("keyboard-hook".into())
            .spawn(move || {
                let event_tx = hook_tx.clone();
                info!("Hook: installing global keyboard listener");
                // Mouse events and keys without identity are left out here.
                let result = rdev::listen(move |event| {
                    if let Some(observed) = ObservedKey::from_rdev(&event) {
                        if event_tx.send_blocking(Message::Key(observed)).is_err() {
                            debug!("Hook: window is gone, dropping {observed:?}");
                        }
                    }
                });
                if let Err(e) = result {
                    let e = HostError::Listen(format!("{e:?}"));
                    error!("Hook: {e}");
                    let _ = hook_tx.send_blocking(Message::Failed(e));
                }
            });
        if let Err(e) = spawned {
            error!("Hook: could not spawn listener thread: {e}");
            let _ = output
                .send(Message::Failed(HostError::Listen(e.to_string())))
                .await;
            return;
        }

        while let Ok(message) = hook_rx.recv().await {
            if output.send(message).await.is_err() {
                break;
            }
        }
    })
}
