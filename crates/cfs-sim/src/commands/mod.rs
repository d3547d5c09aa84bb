pub mod stamp;
pub mod sweep;
