use crate::domain::traveler::{DocumentType, EmergencyContact, TravelerDraft};
use crate::error::{Result, StorefrontError};
use serde::Deserialize;
use std::io::Read;

/// One manifest row. Everything is optional so incomplete rows still reach validation,
/// which reports them by position.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TravelerRow {
    name: String,
    age: String,
    gender: String,
    document_type: String,
    document_number: String,
    emergency_name: String,
    emergency_phone: String,
}

impl TravelerRow {
    fn into_draft(self) -> Result<TravelerDraft> {
        let document_type: DocumentType = self
            .document_type
            .parse()
            .map_err(StorefrontError::ValidationError)?;
        Ok(TravelerDraft {
            name: self.name,
            age: self.age,
            gender: self.gender.parse().ok(),
            document_type,
            document_number: self.document_number,
            emergency_contact: EmergencyContact {
                name: self.emergency_name,
                phone: self.emergency_phone,
            },
        })
    }
}

/// Reads a traveler manifest from a CSV source.
///
/// Expected headers: `name, age, gender, document_type, document_number, emergency_name,
/// emergency_phone`. Missing columns are treated as blank.
pub struct TravelerReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TravelerReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn drafts(self) -> impl Iterator<Item = Result<TravelerDraft>> {
        self.reader
            .into_deserialize::<TravelerRow>()
            .map(|row| row.map_err(StorefrontError::from).and_then(TravelerRow::into_draft))
    }

    pub fn read_all(self) -> Result<Vec<TravelerDraft>> {
        self.drafts().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traveler::Gender;

    #[test]
    fn test_reader_valid_manifest() {
        let data = "name, age, gender, document_type, document_number, emergency_name, emergency_phone\n\
                    Asha Rao, 29, female, passport, P1234567, Ravi Rao, 9876543210\n\
                    Dev Rao, 31, M, DL, KA0120110012345,,";
        let drafts = TravelerReader::new(data.as_bytes()).read_all().unwrap();

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].gender, Some(Gender::Female));
        assert_eq!(drafts[0].emergency_contact.phone, "9876543210");
        assert_eq!(drafts[1].document_type, DocumentType::DrivingLicense);
        assert!(drafts[1].validate(2).is_ok());
    }

    #[test]
    fn test_reader_keeps_incomplete_rows_for_validation() {
        let data = "name, age, gender\nAsha Rao, , unknown";
        let drafts = TravelerReader::new(data.as_bytes()).read_all().unwrap();

        assert_eq!(drafts[0].gender, None);
        assert!(matches!(
            drafts[0].validate(1),
            Err(StorefrontError::TravelerIncomplete { position: 1, .. })
        ));
    }

    #[test]
    fn test_reader_rejects_unknown_document_type() {
        let data = "name, document_type\nAsha Rao, library card";
        let results: Vec<Result<TravelerDraft>> =
            TravelerReader::new(data.as_bytes()).drafts().collect();

        assert!(matches!(results[0], Err(StorefrontError::ValidationError(_))));
    }
}
