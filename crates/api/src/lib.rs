pub mod app;
pub mod observability;
pub mod routes;
pub mod security;
pub mod shutdown;
pub mod state;
pub mod validation;
