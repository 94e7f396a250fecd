pub mod errors;
pub mod filing;
pub mod helping;
pub mod hicting;
