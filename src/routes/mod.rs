pub mod health;
pub mod professors;
pub mod reviews;
