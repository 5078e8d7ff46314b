pub mod api;
pub mod api_docs;
pub mod auth;
pub mod config;
pub mod db;
pub mod jobs;
pub mod mailer;
pub mod messages;
pub mod models;
pub mod seed;
pub mod services;
pub mod state;
