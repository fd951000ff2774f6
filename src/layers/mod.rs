pub mod base;
pub mod circle;
pub mod manager;
pub mod marker;
