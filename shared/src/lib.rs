//! Shared library for the appointments service.
//!
//! This crate provides configuration, the appointment model, error types and the
//! persistence gateway used by every deployment of the HTTP API.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod secrets;
pub mod store;

pub use config::{Config, Credentials, DatabaseConfig};
pub use error::{Error, Result};
pub use models::Appointment;
pub use store::{AppointmentStore, SqlAppointmentStore, APPOINTMENT_NOT_FOUND};
