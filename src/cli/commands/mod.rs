pub mod make;
pub mod migrate;
