pub mod professor;
pub mod review;
