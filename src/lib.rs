#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub use app::GatewireApp;
mod camera;
mod circuit_widget;
mod components;
