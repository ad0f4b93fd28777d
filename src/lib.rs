//! WcmViewServer
//!
//! Serves authored web content by binding each requested asset to a
//! presentation view: a page template from the page catalog, or the
//! asset's raw bytes.

pub mod application;
pub mod asset;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub(crate) mod handlers;
pub mod log;
pub mod messages;
pub mod module_tool;
pub mod pages;
pub mod patch;
pub mod prelude;
pub mod repository;
pub mod state;
pub mod typed_path;
pub mod view;
pub mod web;
pub mod webscript;

#[cfg(test)]
pub(crate) mod test_helpers;
