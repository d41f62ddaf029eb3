pub mod batch;
pub mod document;
pub mod fill;
pub mod layout;
