//! Type-safe ID generation and management
//!
//! Every registry keys its records with an [`Id`] whose marker type fixes the
//! prefix used for freshly generated keys (`app-1717171717171`). Keys loaded
//! from fixtures or persisted sessions (`d1`, `app1`) are accepted as-is.

use compact_str::CompactString;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

/// A type-safe ID backed by a short string key
pub struct Id<T> {
    key: CompactString,
    _phantom: PhantomData<T>,
}

// Manual impls so the marker type doesn't need to satisfy the bounds
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl<T: IdType> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Trait for types that can be used as ID markers
pub trait IdType: Send + Sync + 'static {
    /// The prefix for generated IDs of this type (e.g., "p" for patients, "app" for appointments)
    const PREFIX: &'static str;
}

/// Errors that can occur when working with IDs
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum IdError {
    #[error("ID must not be empty")]
    #[diagnostic(help("Pass the identifier shown in the listing, e.g. 'd1' or 'app-1717171717171'"))]
    Empty,

    #[error("Invalid ID format: {0}")]
    #[diagnostic(help("IDs cannot contain whitespace"))]
    InvalidFormat(String),
}

/// Last timestamp handed out, so keys stay unique within one process
static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

fn next_stamp() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let mut last = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let candidate = if now > last { now } else { last + 1 };
        match LAST_STAMP.compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

impl<T: IdType> Id<T> {
    /// Create a new ID of the form `prefix-timestamp`
    ///
    /// The timestamp is in milliseconds and strictly increases across calls,
    /// even when two IDs are generated within the same millisecond.
    pub fn generate() -> Self {
        Self {
            key: compact_str::format_compact!("{}-{}", T::PREFIX, next_stamp()),
            _phantom: PhantomData,
        }
    }

    /// Parse an ID from a string
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(IdError::InvalidFormat(s.to_string()));
        }

        Ok(Self {
            key: CompactString::new(s),
            _phantom: PhantomData,
        })
    }

    /// Build an ID from a literal key. Intended for fixtures.
    pub fn from_static(key: &'static str) -> Self {
        Self {
            key: CompactString::const_new(key),
            _phantom: PhantomData,
        }
    }

    /// Get the prefix for this ID type
    pub fn prefix(&self) -> &'static str {
        T::PREFIX
    }

    pub fn as_str(&self) -> &str {
        self.key.as_str()
    }
}

impl<T: IdType> Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl<T: IdType> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<T: IdType> From<Id<T>> for String {
    fn from(id: Id<T>) -> Self {
        id.key.into_string()
    }
}

impl<T: IdType> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

impl<T: IdType> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.key)
    }
}

struct IdVisitor<T>(PhantomData<T>);

impl<'de, T: IdType> Visitor<'de> for IdVisitor<T> {
    type Value = Id<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a non-empty identifier without whitespace")
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Id::parse(s).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl<'de, T: IdType> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(IdVisitor(PhantomData))
    }
}

/// Macro to define new ID types with minimal boilerplate
#[macro_export]
macro_rules! define_id_type {
    ($type_name:ident, $prefix:expr) => {
        /// Marker type for the ID
        #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
        pub struct $type_name;

        impl $crate::id::IdType for $type_name {
            const PREFIX: &'static str = $prefix;
        }
    };
}

define_id_type!(PatientIdType, "p");
define_id_type!(DoctorIdType, "d");
define_id_type!(AdminIdType, "a");
define_id_type!(AppointmentIdType, "app");
define_id_type!(PrescriptionIdType, "rx");
define_id_type!(ReviewIdType, "rev");

/// Type alias for patient IDs
pub type PatientId = Id<PatientIdType>;

/// Type alias for doctor IDs
pub type DoctorId = Id<DoctorIdType>;

/// Type alias for admin IDs
pub type AdminId = Id<AdminIdType>;

/// Type alias for appointment IDs
pub type AppointmentId = Id<AppointmentIdType>;

/// Type alias for prescription IDs
pub type PrescriptionId = Id<PrescriptionIdType>;

/// Type alias for review IDs
pub type ReviewId = Id<ReviewIdType>;
