pub mod application;
pub mod invite;
pub mod membership;
pub mod subscription;
pub mod workspace;
