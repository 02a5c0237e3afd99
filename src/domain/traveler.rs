use crate::error::{StorefrontError, TravelerField};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum Gender {
    #[serde(alias = "male", alias = "MALE")]
    Male,
    #[serde(alias = "female", alias = "FEMALE")]
    Female,
    #[serde(alias = "other", alias = "OTHER")]
    Other,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum DocumentType {
    #[default]
    #[serde(alias = "passport")]
    Passport,
    #[serde(alias = "aadhar", alias = "Aadhaar")]
    Aadhar,
    #[serde(rename = "DL", alias = "dl")]
    DrivingLicense,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentType::Passport => "Passport",
            DocumentType::Aadhar => "Aadhar",
            DocumentType::DrivingLicense => "DL",
        };
        f.write_str(label)
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "passport" => Ok(DocumentType::Passport),
            "aadhar" | "aadhaar" => Ok(DocumentType::Aadhar),
            "dl" | "driving license" | "driving licence" => Ok(DocumentType::DrivingLicense),
            other => Err(format!("unknown document type: {other}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct EmergencyContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// The logged-in user's details, used to prefill forms and the payment widget.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
}

/// Explicit user context handed to the services that need it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub profile: UserProfile,
}

impl Session {
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }
}

/// A traveler form row as the user is filling it in.
///
/// Fields hold raw input: `age` is text until validated and `gender` may still be unselected.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TravelerDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub document_type: DocumentType,
    #[serde(default)]
    pub document_number: String,
    #[serde(default)]
    pub emergency_contact: EmergencyContact,
}

impl TravelerDraft {
    /// Blank forms for `count` travelers; the first one is the account holder.
    pub fn roster(count: usize, profile: &UserProfile) -> Vec<TravelerDraft> {
        (0..count)
            .map(|index| {
                if index == 0 {
                    TravelerDraft {
                        name: profile.name.clone(),
                        emergency_contact: profile.emergency_contact.clone().unwrap_or_default(),
                        ..Default::default()
                    }
                } else {
                    TravelerDraft::default()
                }
            })
            .collect()
    }

    /// Checks the required fields; `position` is the 1-based row shown to the user.
    pub fn validate(&self, position: usize) -> Result<Traveler, StorefrontError> {
        let missing = |field| StorefrontError::TravelerIncomplete { position, field };

        let name = self.name.trim();
        if name.is_empty() {
            return Err(missing(TravelerField::Name));
        }
        let age: u8 = self
            .age
            .trim()
            .parse()
            .map_err(|_| missing(TravelerField::Age))?;
        let gender = self.gender.ok_or_else(|| missing(TravelerField::Gender))?;
        let document_number = self.document_number.trim();
        if document_number.is_empty() {
            return Err(missing(TravelerField::DocumentNumber));
        }

        Ok(Traveler {
            name: name.to_string(),
            age,
            gender,
            document_type: self.document_type,
            document_number: document_number.to_string(),
            emergency_contact: self.emergency_contact.clone(),
        })
    }
}

impl From<&Traveler> for TravelerDraft {
    fn from(traveler: &Traveler) -> Self {
        Self {
            name: traveler.name.clone(),
            age: traveler.age.to_string(),
            gender: Some(traveler.gender),
            document_type: traveler.document_type,
            document_number: traveler.document_number.clone(),
            emergency_contact: traveler.emergency_contact.clone(),
        }
    }
}

/// A traveler record that passed form validation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Traveler {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    #[serde(default)]
    pub document_type: DocumentType,
    pub document_number: String,
    #[serde(default)]
    pub emergency_contact: EmergencyContact,
}

/// Validates every row, stopping at the first incomplete one.
pub fn validate_all(drafts: &[TravelerDraft]) -> Result<Vec<Traveler>, StorefrontError> {
    drafts
        .iter()
        .enumerate()
        .map(|(index, draft)| draft.validate(index + 1))
        .collect()
}
