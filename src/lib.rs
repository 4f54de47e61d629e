#![doc = "pubdesk: admin-side client for a publications/newsletter backend."]

//! This crate contains the full admin client: a typed REST client with
//! bearer-token sessions, the image upload pipeline (validation, optional
//! resize, response normalization, legacy-endpoint fallback), the upload
//! widget state machine, and the publication draft with markdown preview.
//!
//! # Usage
//! Construct a [`config::Config`], wire a [`session::FileSessionStore`] and a
//! [`contract::LoginRedirect`] into an [`http::ApiClient`], and hand that
//! client to [`upload::ImageUploadService`] and
//! [`publications::PublicationApi`].

pub mod auth;
pub mod cli;
pub mod config;
pub mod contract;
pub mod error;
pub mod form;
pub mod http;
pub mod imaging;
pub mod load_config;
pub mod markdown;
pub mod publications;
pub mod session;
pub mod upload;
pub mod widget;

pub use error::{ClientError, Result};
