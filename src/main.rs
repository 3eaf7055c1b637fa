#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use iced::Task;

mod capture;
mod codec;
mod config;
mod custom_widget;
mod error;
mod host;
mod hotkey;
mod persistence;
mod player;
mod recording;
mod session;
mod subscription;
mod utils;
mod window;

fn main() -> iced::Result {
    pretty_env_logger::init();
    let settings = config::Settings::from_env();
    log::info!("Starting with {settings:?}");

    iced::application(
        window::main::title,
        window::main::update,
        window::main::view,
    )
    .theme(window::main::theme)
    .subscription(window::main::subscription)
    .window_size(iced::Size::new(400.0, 550.0))
    .resizable(false)
    .run_with(move || (window::main::State::new(settings), Task::none()))
}
