//! Vehicle record value types
//!
//! Every value handed to the repository has been checked here first:
//! - `CarId`: positive integer
//! - `CarYear`: model year between 1886 and 2100
//! - `CarText`: make/model, non-empty, at most 64 characters
//! - `DeletedFlag`: 0 (active) or 1 (soft-deleted)

use serde::Serialize;

use super::ValidationError;

/// Maximum length for make and model strings (matches VARCHAR(64))
const MAX_TEXT_LEN: usize = 64;

/// Earliest accepted model year
pub const MIN_YEAR: i64 = 1886;

/// Latest accepted model year
pub const MAX_YEAR: i64 = 2100;

/// Store-generated record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CarId(i64);

impl CarId {
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(ValidationError::InvalidFormat {
                field: "id",
                reason: "must be a positive integer",
            });
        }
        Ok(Self(id))
    }

    /// Parse an id from its path segment form.
    ///
    /// # Example
    /// ```
    /// use carlot_server::models::CarId;
    ///
    /// assert_eq!(CarId::parse("5").unwrap().get(), 5);
    /// assert!(CarId::parse("five").is_err());
    /// assert!(CarId::parse("0").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let id = s.trim().parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
            field: "id",
            reason: "must be a positive integer",
        })?;
        Self::new(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

/// Vehicle model year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CarYear(i64);

impl CarYear {
    pub fn new(year: i64) -> Result<Self, ValidationError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ValidationError::OutOfRange {
                field: "year",
                min: MIN_YEAR,
                max: MAX_YEAR,
                value: year,
            });
        }
        Ok(Self(year))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

/// Make or model name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CarText(String);

impl CarText {
    pub fn new(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field });
        }

        if s.chars().count() > MAX_TEXT_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_TEXT_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Soft-delete marker, stored and serialized as 0/1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum DeletedFlag {
    Active,
    Deleted,
}

impl DeletedFlag {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Active => 0,
            Self::Deleted => 1,
        }
    }
}

impl TryFrom<i64> for DeletedFlag {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Active),
            1 => Ok(Self::Deleted),
            other => Err(ValidationError::OutOfRange {
                field: "deleted_flag",
                min: 0,
                max: 1,
                value: other,
            }),
        }
    }
}

impl From<DeletedFlag> for u8 {
    fn from(flag: DeletedFlag) -> Self {
        flag.as_i64() as u8
    }
}

/// Validated insert payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCar {
    pub year: CarYear,
    pub make: CarText,
    pub model: CarText,
    pub deleted_flag: DeletedFlag,
}

/// Validated year change for an existing record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearUpdate {
    pub id: CarId,
    pub year: CarYear,
}
