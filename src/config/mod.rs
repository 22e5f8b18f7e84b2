mod hub;
mod server;

pub use hub::HubConfig;
pub use server::ServerConfig;
