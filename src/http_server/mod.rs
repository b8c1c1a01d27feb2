pub mod app;
pub mod auth;
pub mod error;
pub mod http_routes;
pub mod response;
pub mod state;
pub mod validator;
