pub mod gateway;
pub mod service;

pub use gateway::{ApiRequest, GatewayError, HttpGateway, Method, RemoteGateway};
pub use service::ApiService;
