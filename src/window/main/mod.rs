use std::{path::PathBuf, sync::Arc};

use iced::{
    Element, Length, Subscription, Task, Theme,
    alignment::Vertical,
    widget::{button, checkbox, column, horizontal_space, row, text},
};
use log::{debug, error, info, warn};

use crate::{
    capture::ObservedKey,
    config::Settings,
    custom_widget::status_lamp::status_lamp,
    error::{HostError, SessionError},
    host::RdevHost,
    hotkey::{HotkeyAction, HotkeyBindings, HotkeyMatcher},
    player::PlaybackOutcome,
    session::{Notification, Notifier, Session, Status},
    subscription,
    utils::SubscriptionExt,
};

mod mapper;

pub struct State {
    session: Session,
    hotkeys: HotkeyMatcher,
    info: String,
}

impl State {
    pub fn new(settings: Settings) -> Self {
        let bindings = settings.hotkeys.parse().unwrap_or_else(|e| {
            error!("{e}, using default hotkeys");
            HotkeyBindings::default().parse().unwrap_or_default()
        });
        let hotkeys = HotkeyMatcher::new(bindings);
        for (hotkey, action) in hotkeys.bindings() {
            debug!("Hotkey {hotkey} bound to {action:?}");
        }
        Self {
            session: Session::new(
                Arc::new(RdevHost),
                settings.loop_enabled,
                settings.loop_pause(),
            ),
            hotkeys,
            info: String::new(),
        }
    }

    fn report(&mut self, info: impl Into<String>) {
        self.info = info.into();
        info!("{}", self.info);
    }

    fn shortcut(&self, action: HotkeyAction) -> String {
        self.hotkeys
            .hotkey_for(action)
            .map(|hotkey| hotkey.label())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    GlobalKey(ObservedKey),
    HookFailed(HostError),
    NotifierReady(Notifier),
    SessionNotification(Notification),
    StartRecording,
    StopRecording,
    Play,
    StopPlayback,
    ToggleLoop,
    SetLoop(bool),
    Save,
    SavePathPicked(Option<PathBuf>),
    Load,
    LoadPathPicked(Option<PathBuf>),
}

pub fn title(_state: &State) -> String {
    "Macro Recorder".into()
}

pub fn update(state: &mut State, message: Message) -> Task<Message> {
    match message {
        Message::GlobalKey(observed) => {
            let hotkey = state.hotkeys.observe(&observed);
            state.session.capture(observed);
            // Replayed input must not drive the controls.
            if let Some(action) = hotkey {
                if state.session.status() != Status::Playing {
                    return Task::done(action.into());
                }
            }
        }
        Message::HookFailed(e) => state.report(format!("Global hotkeys unavailable: {e}")),
        Message::NotifierReady(notifier) => state.session.set_notifier(notifier),
        Message::SessionNotification(notification) => match notification {
            Notification::StatusChanged(status) => {
                debug!("Window: session is {status}");
            }
            Notification::PlaybackFinished(PlaybackOutcome::Failed(e)) => {
                state.report(format!("Playback failed: {e}"));
            }
            Notification::PlaybackFinished(_) => {}
        },
        Message::StartRecording => match state.session.start_recording() {
            Ok(()) => state.info.clear(),
            Err(e) => state.report(e.to_string()),
        },
        Message::StopRecording => match state.session.stop_recording() {
            Ok(_) => state.info.clear(),
            Err(e) => state.report(e.to_string()),
        },
        Message::Play => match state.session.play() {
            Ok(_) => state.info.clear(),
            Err(e) => state.report(e.to_string()),
        },
        Message::StopPlayback => {
            if let Err(e) = state.session.cancel_playback() {
                warn!("{e}");
            }
        }
        Message::ToggleLoop => {
            state.session.toggle_loop();
        }
        Message::SetLoop(enabled) => state.session.set_loop(enabled),
        Message::Save => {
            if state.session.event_count() == 0 {
                state.report(SessionError::NothingToSave.to_string());
            } else {
                return Task::perform(pick_save_path(), Message::SavePathPicked);
            }
        }
        Message::SavePathPicked(Some(path)) => match state.session.save(&path) {
            Ok(_) => state.report(format!("Macro saved to {}", path.display())),
            Err(e) => state.report(e.to_string()),
        },
        Message::Load => return Task::perform(pick_load_path(), Message::LoadPathPicked),
        Message::LoadPathPicked(Some(path)) => match state.session.load(&path) {
            Ok(_) => state.report(format!("Macro loaded from {}", path.display())),
            Err(e) => state.report(e.to_string()),
        },
        Message::SavePathPicked(None) | Message::LoadPathPicked(None) => {}
    }

    Task::none()
}

async fn pick_save_path() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .add_filter("JSON files", &["json"])
        .set_file_name("macro.json")
        .save_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

async fn pick_load_path() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .add_filter("JSON files", &["json"])
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

pub fn theme(_state: &State) -> iced::Theme {
    Theme::Oxocarbon
}

fn hint<'a>(label: String) -> Element<'a, Message> {
    text(label)
        .size(11)
        .style(|theme: &iced::Theme| text::Style {
            color: Some(theme.extended_palette().background.strong.color),
        })
        .into()
}

fn control<'a>(
    state: &State,
    label: &'a str,
    message: Message,
    action: HotkeyAction,
) -> Element<'a, Message> {
    row![
        button(text(label)).on_press(message).width(Length::Fill),
        hint(state.shortcut(action)),
    ]
    .spacing(8)
    .align_y(Vertical::Center)
    .into()
}

pub fn view(state: &State) -> Element<Message> {
    let status = state.session.status();
    let status_text = match status {
        Status::Idle => "Status: Idle",
        Status::Recording => "Status: Recording...",
        Status::Playing => "Status: Playing...",
    };

    column![
        text("Macro Recorder").size(22),
        row![status_lamp(status).diameter(10.0), text(status_text)]
            .spacing(8)
            .align_y(Vertical::Center),
        control(
            state,
            "Start Recording",
            Message::StartRecording,
            HotkeyAction::StartRecording
        ),
        control(
            state,
            "Stop Recording",
            Message::StopRecording,
            HotkeyAction::StopRecording
        ),
        control(state, "Playback", Message::Play, HotkeyAction::Play),
        control(state, "Save Macro", Message::Save, HotkeyAction::Save),
        control(state, "Load Macro", Message::Load, HotkeyAction::Load),
        row![
            checkbox("Loop Playback", state.session.loop_enabled())
                .on_toggle(Message::SetLoop),
            horizontal_space(),
            hint(state.shortcut(HotkeyAction::ToggleLoop)),
        ]
        .align_y(Vertical::Center),
        button(text("Stop Playback"))
            .on_press_maybe((status == Status::Playing).then_some(Message::StopPlayback))
            .width(Length::Fill),
        text(format!("Keys recorded: {}", state.session.event_count())),
        text(state.info.as_str()),
    ]
    .spacing(10)
    .padding(10)
    .into()
}

pub fn subscription(_state: &State) -> Subscription<Message> {
    let hook = Subscription::run(subscription::hook::subscription).map_into();
    let notifier = Subscription::run(subscription::notifier::subscription).map_into();

    Subscription::batch([hook, notifier])
}
