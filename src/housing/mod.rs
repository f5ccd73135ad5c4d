//! Owning versus renting: the two sides of a comparison

pub mod apartment;
pub mod home;

pub use apartment::Apartment;
pub use home::Home;
