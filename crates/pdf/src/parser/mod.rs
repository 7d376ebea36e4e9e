pub mod backend;
pub mod drawing;
