pub mod places;
pub mod sync;
