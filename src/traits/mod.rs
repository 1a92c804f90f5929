//! Trait definitions shared by the model types.

mod from_data;

pub use from_data::FromData;
