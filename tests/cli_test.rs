mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::write_manifest;
use predicates::prelude::*;
use std::process::Command;

/// The binary in sandbox mode, isolated from any local configuration.
fn tourcart() -> Command {
    let mut cmd = Command::new(cargo_bin!());
    cmd.env_remove("TOURCART_API_URL")
        .env_remove("TOURCART_TOKEN")
        .env("TOURCART_USER_NAME", "Asha Rao")
        .env("TOURCART_USER_EMAIL", "asha@example.com");
    cmd
}

#[test]
fn test_tours_lists_sandbox_catalog() -> Result<(), Box<dyn std::error::Error>> {
    tourcart()
        .args(["tours", "--sort", "price-low"])
        .assert()
        .success()
        .stdout(predicate::str::contains("goa-beach-escape\tGoa Beach Escape\t10000\t5D/4N"))
        .stdout(predicate::str::contains("Page 1 of 1 (4 tours)"));

    Ok(())
}

#[test]
fn test_checkout_approved() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_manifest(dir.path(), 2)?;

    tourcart()
        .args(["checkout", "--tour", "goa-beach-escape", "--date", "2027-01-10"])
        .arg("--travelers")
        .arg(&manifest)
        .args(["--gateway", "approve"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Amount payable: 20000"))
        .stdout(predicate::str::contains("Booking confirmed: bk_1"))
        .stdout(predicate::str::contains("Redirect: /user/booking-success/bk_1"));

    Ok(())
}

#[test]
fn test_checkout_dismissed_exits_with_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_manifest(dir.path(), 1)?;

    tourcart()
        .args(["checkout", "--tour", "goa-beach-escape", "--date", "2027-01-10"])
        .arg("--travelers")
        .arg(&manifest)
        .args(["--gateway", "dismiss"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Booking confirmed").not())
        .stderr(predicate::str::contains("Payment cancelled"));

    Ok(())
}

#[test]
fn test_checkout_rejected_signature() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_manifest(dir.path(), 1)?;

    tourcart()
        .args(["checkout", "--tour", "goa-beach-escape", "--date", "2027-01-10"])
        .arg("--travelers")
        .arg(&manifest)
        .args(["--gateway", "decline"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Payment verification failed. Please contact support.",
        ));

    Ok(())
}

#[test]
fn test_checkout_oversized_party_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_manifest(dir.path(), 5)?;

    tourcart()
        .args(["checkout", "--tour", "ladakh-bike-expedition", "--date", "2027-06-05"])
        .arg("--travelers")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 4 travelers"));

    Ok(())
}

#[test]
fn test_checkout_empty_cart() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_manifest(dir.path(), 1)?;

    tourcart()
        .arg("checkout")
        .arg("--travelers")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Your cart is empty"));

    Ok(())
}

#[test]
fn test_cart_add_prints_priced_line() -> Result<(), Box<dyn std::error::Error>> {
    tourcart()
        .args([
            "cart",
            "add",
            "--tour",
            "goa-beach-escape",
            "--travelers",
            "3",
            "--date",
            "2027-02-14",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Goa Beach Escape\t2027-02-14 x3\t30000"))
        .stdout(predicate::str::contains("Total: 30000"));

    Ok(())
}

#[test]
fn test_bookings_csv_export() -> Result<(), Box<dyn std::error::Error>> {
    tourcart()
        .args(["bookings", "--csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "id,reference,tour,start_date,travelers,total,booking_status,payment_status",
        ))
        .stdout(predicate::str::contains(
            "bk_demo_1,TRZ-DEMO-1,Kerala Backwaters Retreat,2027-03-20,2,37000,Pending,Pending",
        ));

    Ok(())
}

#[test]
fn test_pay_pending_booking() -> Result<(), Box<dyn std::error::Error>> {
    tourcart()
        .args(["pay", "bk_demo_1", "--gateway", "approve"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Payment verified: bk_1"));

    Ok(())
}

#[test]
fn test_cancel_requires_reason() -> Result<(), Box<dyn std::error::Error>> {
    tourcart()
        .args(["cancel", "bk_demo_1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please provide a reason for cancellation"));

    tourcart()
        .args(["cancel", "bk_demo_1", "--reason", "Change of plans"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled/Pending"));

    Ok(())
}

#[test]
fn test_unknown_tour() -> Result<(), Box<dyn std::error::Error>> {
    tourcart()
        .args(["tour", "atlantis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tour not found"));

    Ok(())
}
