pub mod auth_service;
pub mod clock;
pub mod nickname;
pub mod rate_limit;
pub mod session_store;
pub mod template_params;
