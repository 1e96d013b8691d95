//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod car;
pub mod validation;

pub use car::{CarId, CarText, CarYear, DeletedFlag, NewCar, YearUpdate};
pub use validation::{require, ValidationError};
