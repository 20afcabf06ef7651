pub mod accounts;
pub mod auth;
pub mod complaints;
pub mod error;
pub mod lifecycle;
pub mod middleware;
pub mod routes;
pub mod token;
pub mod users;
