pub mod init;
pub mod inject;
pub mod routes;
