#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::fs::File;
use std::io::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tourcart::application::Storefront;
use tourcart::domain::money::Price;
use tourcart::domain::tour::Tour;
use tourcart::domain::traveler::{Gender, Session, TravelerDraft, UserProfile};
use tourcart::infrastructure::gateway::{GatewayScript, ScriptedGateway};
use tourcart::infrastructure::in_memory::{InMemoryStorefront, sandbox_tour};

pub fn departure() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 12, 20).unwrap()
}

/// 10000 per traveler, at most 6 travelers.
pub fn goa() -> Tour {
    sandbox_tour("goa", "Goa Beach Escape", Price::new(dec!(10000)), 6)
}

pub fn manali() -> Tour {
    sandbox_tour("manali", "Manali Snow Trek", Price::new(dec!(7500)), 4)
}

pub fn session() -> Session {
    Session::new(UserProfile {
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "9999999999".to_string(),
        emergency_contact: None,
    })
}

pub fn drafts(count: usize) -> Vec<TravelerDraft> {
    (1..=count)
        .map(|i| TravelerDraft {
            name: format!("Traveler {i}"),
            age: (20 + i).to_string(),
            gender: Some(Gender::Female),
            document_number: format!("P{i:07}"),
            ..Default::default()
        })
        .collect()
}

/// A storefront over `sandbox` whose payment widget plays `script`.
pub fn storefront(
    sandbox: &InMemoryStorefront,
    script: GatewayScript,
) -> (Storefront, Arc<ScriptedGateway>) {
    let gateway = Arc::new(ScriptedGateway::new(script));
    let api = Arc::new(sandbox.clone());
    let store = Storefront::new(
        api.clone(),
        api.clone(),
        api,
        gateway.clone(),
        session(),
        "Tripzybee",
    );
    (store, gateway)
}

/// Writes a traveler manifest with `rows` complete travelers.
pub fn write_manifest(dir: &Path, rows: usize) -> Result<PathBuf, Error> {
    let path = dir.join("travelers.csv");
    let file = File::create(&path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record([
        "name",
        "age",
        "gender",
        "document_type",
        "document_number",
        "emergency_name",
        "emergency_phone",
    ])?;
    for i in 1..=rows {
        wtr.write_record([
            format!("Traveler {i}").as_str(),
            "30",
            "female",
            "passport",
            &format!("P{i:07}"),
            "Ravi Rao",
            "9876543210",
        ])?;
    }

    wtr.flush()?;
    Ok(path)
}
