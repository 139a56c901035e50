//! Domain models that mirror the `entries` table and get passed throughout the
//! TUI. Both form variants share the same record type: the basic variant simply
//! leaves the extended fields empty, so the store, the renderer and the form
//! only ever deal with one shape.

use std::fmt;
use std::str::FromStr;

/// Literal shown (and, for the extended form, stored) in place of a missing
/// value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Every field an entry can carry, in the fixed order used by both the form and
/// the rendered cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Address,
    Phone,
    Email,
    EmergencyContact1,
    EmergencyContact2,
    DateOfBirth,
    IdType,
    IdNumber,
    IdExpiry,
    Result,
}

impl Field {
    /// Label printed in front of the value in forms and entry cards.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Address => "Address",
            Field::Phone => "Phone",
            Field::Email => "Email",
            Field::EmergencyContact1 => "Emergency Contact 1",
            Field::EmergencyContact2 => "Emergency Contact 2",
            Field::DateOfBirth => "Date of Birth",
            Field::IdType => "ID Type",
            Field::IdNumber => "ID Number",
            Field::IdExpiry => "ID Expiry Date",
            Field::Result => "Result",
        }
    }

    /// Whether the extended form swaps an empty submission for [`NOT_AVAILABLE`].
    /// The address feeds the parity sort and the result feeds the filter, so
    /// both are kept exactly as typed.
    pub fn defaults_to_not_available(self) -> bool {
        !matches!(self, Field::Address | Field::Result)
    }
}

/// Which set of fields the form collects and the list displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldSet {
    /// Name, address, phone, email and result. Values are stored verbatim.
    Basic,
    /// The basic fields plus emergency contacts and identity document details.
    /// Blank values are stored as `"N/A"` and entries can be deleted.
    #[default]
    Extended,
}

const BASIC_FIELDS: &[Field] = &[
    Field::Name,
    Field::Address,
    Field::Phone,
    Field::Email,
    Field::Result,
];

const EXTENDED_FIELDS: &[Field] = &[
    Field::Name,
    Field::Address,
    Field::Phone,
    Field::Email,
    Field::EmergencyContact1,
    Field::EmergencyContact2,
    Field::DateOfBirth,
    Field::IdType,
    Field::IdNumber,
    Field::IdExpiry,
    Field::Result,
];

impl FieldSet {
    /// Fields collected by this variant, in display order.
    pub fn fields(self) -> &'static [Field] {
        match self {
            FieldSet::Basic => BASIC_FIELDS,
            FieldSet::Extended => EXTENDED_FIELDS,
        }
    }

    /// Only the extended variant exposes per-entry delete and delete-all.
    pub fn supports_delete(self) -> bool {
        matches!(self, FieldSet::Extended)
    }

    /// Apply this variant's submission rule to a raw form value.
    pub fn submitted_value(self, field: Field, raw: &str) -> String {
        match self {
            FieldSet::Extended if raw.is_empty() && field.defaults_to_not_available() => {
                NOT_AVAILABLE.to_string()
            }
            _ => raw.to_string(),
        }
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSet::Basic => write!(f, "basic"),
            FieldSet::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for FieldSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(FieldSet::Basic),
            "extended" => Ok(FieldSet::Extended),
            other => Err(format!("unknown field set `{other}` (expected basic or extended)")),
        }
    }
}

/// Field values of an entry, without the store-assigned id. This is what the
/// form hands to [`crate::db::EntryStore::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFields {
    pub name: String,
    /// Free text; the first run of digits is used as the sort key.
    pub address: String,
    pub phone: String,
    /// Optional so rows written without an email render as `"N/A"`.
    pub email: Option<String>,
    pub emergency_contact_1: Option<String>,
    pub emergency_contact_2: Option<String>,
    pub date_of_birth: Option<String>,
    pub id_type: Option<String>,
    pub id_number: Option<String>,
    pub id_expiry: Option<String>,
    /// Discriminant matched exactly by the list filter.
    pub result: String,
}

impl EntryFields {
    /// Read a single field. Absent optional fields return `None`.
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => Some(&self.name),
            Field::Address => Some(&self.address),
            Field::Phone => Some(&self.phone),
            Field::Email => self.email.as_deref(),
            Field::EmergencyContact1 => self.emergency_contact_1.as_deref(),
            Field::EmergencyContact2 => self.emergency_contact_2.as_deref(),
            Field::DateOfBirth => self.date_of_birth.as_deref(),
            Field::IdType => self.id_type.as_deref(),
            Field::IdNumber => self.id_number.as_deref(),
            Field::IdExpiry => self.id_expiry.as_deref(),
            Field::Result => Some(&self.result),
        }
    }

    /// Overwrite a single field.
    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Address => self.address = value,
            Field::Phone => self.phone = value,
            Field::Email => self.email = Some(value),
            Field::EmergencyContact1 => self.emergency_contact_1 = Some(value),
            Field::EmergencyContact2 => self.emergency_contact_2 = Some(value),
            Field::DateOfBirth => self.date_of_birth = Some(value),
            Field::IdType => self.id_type = Some(value),
            Field::IdNumber => self.id_number = Some(value),
            Field::IdExpiry => self.id_expiry = Some(value),
            Field::Result => self.result = value,
        }
    }
}

/// A stored record. The `id` is assigned once by the store and is the delete
/// target; everything else is immutable after insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: i64,
    pub fields: EntryFields,
}

impl Entry {
    /// Value to display for `field`, falling back to `"N/A"` when absent.
    pub fn display_value(&self, field: Field) -> &str {
        self.fields.get(field).unwrap_or(NOT_AVAILABLE)
    }
}
