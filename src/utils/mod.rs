pub mod errors;
pub mod storage;
pub mod validation;
