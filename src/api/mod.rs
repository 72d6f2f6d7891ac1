//! Request handling layer between the HTTP server and the generators

pub mod connect;
pub mod generate;
pub mod types;

pub use connect::generate_procedural_path;
pub use generate::generate_map;
pub use types::{
    CliffPassRequest, CliffPassResponse, ConnectRequest, ConnectResponse, GenerateOptions,
    GenerateRequest, MapResponse, WallPassRequest, WallPassResponse,
};
