use easy_ext::ext;
use iced::Subscription;
use log::warn;

#[ext(SubscriptionExt)]
impl<T> Subscription<T> {
    pub fn map_into<O>(self) -> Subscription<O>
    where
        O: From<T> + 'static,
        T: 'static,
    {
        self.map(Into::into)
    }
}

#[ext(NotifierOption)]
impl<T: std::fmt::Debug> Option<smol::channel::Sender<T>> {
    /// Best-effort delivery to the window; nothing to do when no one listens.
    pub fn notify(&self, t: T) {
        if let Some(sender) = self {
            if let Err(e) = sender.try_send(t) {
                warn!("Dropped notification: {e:?}");
            }
        }
    }
}
