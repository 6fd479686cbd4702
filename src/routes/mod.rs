pub mod price;
pub mod system;
