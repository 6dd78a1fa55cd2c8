pub mod info;
pub mod mine;
