// src/web/handlers/mod.rs

pub mod export_handlers;
pub mod parse_handlers;
pub mod profile_handlers;
pub mod system_handlers;

pub use export_handlers::*;
pub use parse_handlers::*;
pub use profile_handlers::*;
pub use system_handlers::*;
