pub mod middleware;
pub mod service;
pub mod session;

pub use service::HttpService;
pub use session::Session;
