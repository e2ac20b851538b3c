pub mod audit;
pub mod dispatch;
pub mod init;
pub mod reconcile;
pub mod resync;
pub mod schema;
pub mod shared;
pub mod status;
