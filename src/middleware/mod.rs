// Middleware module - request logging and HTTP metrics

pub mod metrics;
pub mod request_logger;

pub use self::metrics::metrics_middleware;
pub use self::request_logger::request_logger_middleware;
