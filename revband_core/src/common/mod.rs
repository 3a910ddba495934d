pub mod enums;
pub mod errors;
