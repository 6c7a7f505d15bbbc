pub mod api;
pub mod config;
pub mod debug_log;
pub mod domain;
pub mod forms;
pub mod hooks;
pub mod list_data_mapper;
pub mod listener;
pub mod mailchimp_client;
mod routes;
mod startup;
pub mod telemetry;
mod util;
pub mod validation;

pub use startup::run;
