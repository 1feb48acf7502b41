pub mod attribute;
pub mod descriptive;
pub mod error;
pub mod field;
pub mod locate;
pub mod markers;
