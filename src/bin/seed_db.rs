//! Fills a customer database with a few days of sample walk-ins.

use chrono::{Duration, Local, NaiveTime};
use customer_desk::infra::clock::FixedClock;
use customer_desk::infra::db::Database;
use std::sync::Arc;

const SAMPLE_NAMES: &[&str] = &[
    "Nimal Perera",
    "Kasun Silva",
    "Anjali Fernando",
    "Ruwan Jayasinghe",
    "Dilani Wickramasinghe",
    "Tharindu Bandara",
    "Sachini Rathnayake",
    "Mohamed Rizwan",
    "Priya Shanmugam",
    "Chamara Dissanayake",
];

const DAYS: i64 = 3;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = Database::default_path();
    println!("Connecting to database at: {}", db_path.display());

    let db = Database::open_at(&db_path)?;
    let today = Local::now().date_naive();
    let opening = NaiveTime::from_hms_opt(8, 30, 0).ok_or("invalid opening time")?;

    let clock = Arc::new(FixedClock::new((today - Duration::days(DAYS - 1)).and_time(opening)));
    let repo = db.customer_repo().with_clock(clock.clone());

    for day in 0..DAYS {
        let date = today - Duration::days(DAYS - 1 - day);
        clock.set(date.and_time(opening));

        // Fewer customers on earlier days so the per-day numbering is easy to eyeball.
        let count = SAMPLE_NAMES.len() - (DAYS - 1 - day) as usize * 3;
        for name in &SAMPLE_NAMES[..count] {
            clock.advance(Duration::minutes(7));
            let customer = repo.insert_customer(name)?;
            println!(
                "  {} {} {} {}",
                customer.date_added,
                customer.sequence_label(),
                customer.id,
                customer.name
            );
        }
    }

    println!("Total customers: {}", repo.count_all()?);
    println!("Today: {}", repo.count_for_date(today)?);
    Ok(())
}
