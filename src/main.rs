mod api;
mod app;
mod browser;
mod cache;
mod config;
mod controller;
mod conversation;
mod error;
mod group;
mod login;
mod message;
mod nav;
mod render;
mod state;

use app::*;
use leptos::*;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(|| {
        view! { <App /> }
    })
}
