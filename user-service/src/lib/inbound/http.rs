pub mod handlers;
pub mod middleware;
pub mod paths;
pub mod router;
