//! Core of the HOPn admissions site: the application wizard, the persisted language store with
//! dot-path translation lookup, the program catalog, and the mock student-portal login.

pub mod catalog;
pub mod config;
pub mod error;
pub mod i18n;
pub mod portal;
pub mod telemetry;
pub mod workflows;
