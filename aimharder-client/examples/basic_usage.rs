//! Basic usage example for the AimHarder client
//!
//! This example demonstrates how to:
//! - Log in (the client is only created if the login succeeds)
//! - List the classes of a day
//! - Book one of them and react to the different refusals
//!
//! It reads its settings from the environment:
//! `AIMHARDER_EMAIL`, `AIMHARDER_PASSWORD`, `AIMHARDER_BOX_ID`, `AIMHARDER_BOX_NAME`,
//! and optionally `AIMHARDER_CLASS_ID` and `AIMHARDER_FAMILY_ID`.
//! Set `RUST_LOG=aimharder_client=debug` to see every request.

use aimharder_client::{AimHarderClient, AimHarderError, BookingFailureKind, Credentials};
use chrono::{Days, Local};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let email = std::env::var("AIMHARDER_EMAIL")?;
    let password = std::env::var("AIMHARDER_PASSWORD")?;
    let box_id: u64 = std::env::var("AIMHARDER_BOX_ID")?.parse()?;
    let box_name = std::env::var("AIMHARDER_BOX_NAME")?;
    let family_id = std::env::var("AIMHARDER_FAMILY_ID").ok();

    println!("=== Logging in ===");
    let client = match AimHarderClient::builder(box_id, box_name)
        .client_builder(reqwest::blocking::Client::builder().timeout(Duration::from_secs(30)))
        .login(&Credentials::new(email, password))
    {
        Ok(client) => client,
        Err(AimHarderError::TooManyWrongAttempts) => {
            println!("✗ Too many wrong attempts, try again later");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("✓ Logged in to {}", client.box_name());

    let day = Local::now()
        .date_naive()
        .checked_add_days(Days::new(2))
        .ok_or("date out of range")?;

    println!("\n=== Classes on {} ===", day);
    let classes = match client.get_classes_for(day, family_id.as_deref())? {
        Some(classes) => classes,
        None => {
            println!("The portal returned no class list");
            return Ok(());
        }
    };
    for class in &classes {
        println!(
            "{:>8}  {:<10} {}",
            class.id().map(|id| id.to_string()).unwrap_or_default(),
            class.time_id().unwrap_or("?"),
            class.class_name().unwrap_or("?")
        );
    }

    let Ok(class_id) = std::env::var("AIMHARDER_CLASS_ID") else {
        println!("\nSet AIMHARDER_CLASS_ID to book one of them");
        return Ok(());
    };

    println!("\n=== Booking class {} ===", class_id);
    match client.book_class(day, &class_id, family_id.as_deref()) {
        Ok(()) => println!("✓ Booked"),
        Err(AimHarderError::BookingFailed(failure)) => match failure.kind {
            BookingFailureKind::NoCredit => println!("✗ No credit left"),
            BookingFailureKind::Rejected => println!("✗ Refused: {}", failure),
            BookingFailureKind::Unknown => println!("✗ Booking failed: {}", failure),
        },
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
