//! Terminal player for an era-grouped music catalog server.

pub mod audio;
pub mod bridge;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod events;
pub mod logging;
pub mod model;
pub mod view;

#[cfg(test)]
mod test_support;
