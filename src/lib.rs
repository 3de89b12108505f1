// Library surface for headless/integration tests and reuse.
// The binary in main.rs only adds terminal setup and CLI parsing.
pub mod app;
pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod logging;
pub mod notify;
pub mod runtime;
pub mod session;
pub mod sound;
pub mod surface;
pub mod ui;
pub mod util;
