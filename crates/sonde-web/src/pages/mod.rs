//! Built-in diagnostic pages.
//!
//! Pages that show build and host details merge [`code_running::context`]
//! into their own context rather than sharing a base type.

pub mod code_running;
pub mod debug;
pub mod demo;
pub mod devops;
pub mod environment;
pub mod manifest;
pub mod settings;
