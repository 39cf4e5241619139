//! Access-token handling. Tokens are issued by an external login service;
//! this server only validates them.

pub mod jwt;
