use crate::{hotkey::HotkeyAction, subscription, window::main::Message};

impl From<subscription::hook::Message> for Message {
    fn from(message: subscription::hook::Message) -> Self {
        match message {
            subscription::hook::Message::Key(observed) => Message::GlobalKey(observed),
            subscription::hook::Message::Failed(e) => Message::HookFailed(e),
        }
    }
}

impl From<subscription::notifier::Message> for Message {
    fn from(message: subscription::notifier::Message) -> Self {
        match message {
            subscription::notifier::Message::Ready(notifier) => Message::NotifierReady(notifier),
            subscription::notifier::Message::Notification(notification) => {
                Message::SessionNotification(notification)
            }
        }
    }
}

impl From<HotkeyAction> for Message {
    fn from(action: HotkeyAction) -> Self {
        match action {
            HotkeyAction::StartRecording => Message::StartRecording,
            HotkeyAction::StopRecording => Message::StopRecording,
            HotkeyAction::Play => Message::Play,
            HotkeyAction::Save => Message::Save,
            HotkeyAction::Load => Message::Load,
            HotkeyAction::ToggleLoop => Message::ToggleLoop,
        }
    }
}
