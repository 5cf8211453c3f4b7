pub mod app;
pub mod camera;
pub mod config;
pub mod highlight;
pub mod ingest;
pub mod layout;
pub mod model;
pub mod session;
pub mod util;
