mod capture;
mod core;
mod field;
mod primitive;

pub use self::core::*;
pub use capture::*;
pub use field::*;
pub use primitive::*;
