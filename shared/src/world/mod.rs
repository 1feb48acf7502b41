pub mod attribute;
pub mod container;
pub mod entity;
