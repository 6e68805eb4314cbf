pub mod subscription;
pub mod user;
pub mod video;
pub mod watch_history;
