//! Bill identity and records
//!
//! Bills are keyed by the composite `(congress, bill_type, bill_number)`,
//! with the canonical string form `"{congress}_{type}_{number}"` used by the
//! ingestion artifacts, e.g. `118_hr_82`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chamber of origin. The ingestion pipeline emits only House (`hr`) and
/// Senate (`s`) bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillType {
    Hr,
    S,
}

impl BillType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillType::Hr => "hr",
            BillType::S => "s",
        }
    }
}

impl FromStr for BillType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hr" => Ok(BillType::Hr),
            "s" => Ok(BillType::S),
            _ => Err(Error::InvalidBillId(format!("unknown bill type: {}", s))),
        }
    }
}

impl fmt::Display for BillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Composite bill key: `(congress, bill_type, bill_number)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BillId {
    pub congress: u16,
    pub bill_type: BillType,
    pub number: u32,
}

impl BillId {
    pub fn new(congress: u16, bill_type: BillType, number: u32) -> Self {
        Self {
            congress,
            bill_type,
            number,
        }
    }

    /// Parse the canonical string form, e.g. `118_hr_82`.
    pub fn parse(id: &str) -> Result<Self> {
        let mut parts = id.split('_');
        let (congress, bill_type, number) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(c), Some(t), Some(n), None) => (c, t, n),
            _ => {
                return Err(Error::InvalidBillId(format!(
                    "expected congress_type_number, got: {}",
                    id
                )));
            }
        };

        let congress: u16 = congress
            .parse()
            .map_err(|_| Error::InvalidBillId(format!("invalid congress number: {}", congress)))?;
        let bill_type = BillType::from_str(bill_type)?;
        let number: u32 = number
            .parse()
            .map_err(|_| Error::InvalidBillId(format!("invalid bill number: {}", number)))?;

        Ok(Self::new(congress, bill_type, number))
    }
}

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.congress, self.bill_type, self.number)
    }
}

impl FromStr for BillId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for BillId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BillId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BillId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A legislative bill, read-only input to the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub title: String,
    pub became_law: bool,
    /// Public-law number assigned on enactment, e.g. `"118-42"`
    pub public_law_number: Option<String>,
    /// Raw bill text as extracted by ingestion
    pub text: String,
}

impl Bill {
    pub fn new(id: BillId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            became_law: false,
            public_law_number: None,
            text: String::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_public_law(mut self, number: impl Into<String>) -> Self {
        self.public_law_number = Some(number.into());
        self.became_law = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_id_roundtrip() {
        let id = BillId::new(118, BillType::Hr, 82);
        assert_eq!(id.to_string(), "118_hr_82");
        assert_eq!(BillId::parse("118_hr_82").unwrap(), id);
    }

    #[test]
    fn test_bill_id_senate() {
        let id = BillId::parse("118_s_1409").unwrap();
        assert_eq!(id.bill_type, BillType::S);
        assert_eq!(id.number, 1409);
    }

    #[test]
    fn test_invalid_bill_id() {
        assert!(BillId::parse("118_hr").is_err());
        assert!(BillId::parse("118_hjres_5").is_err());
        assert!(BillId::parse("abc_hr_82").is_err());
        assert!(BillId::parse("118_hr_82_extra").is_err());
    }

    #[test]
    fn test_bill_builder() {
        let bill = Bill::new(BillId::parse("118_hr_82").unwrap(), "Social Security Fairness Act")
            .with_text("A bill to amend title II...")
            .with_public_law("118-273");
        assert!(bill.became_law);
        assert_eq!(bill.public_law_number.as_deref(), Some("118-273"));
    }
}
