#![forbid(unsafe_code)]

mod config;
mod dto;
mod protocol;
mod service;
mod session_log;

pub use config::{DEFAULT_API_KEY, ServiceConfig};
pub use dto::{
    ActivityCreate, ActivityOut, BuildingCreate, BuildingOut, OrganizationCreate, OrganizationOut,
    PhoneOut,
};
pub use protocol::LineServer;
pub use service::DirectoryService;
pub use session_log::SessionLog;
