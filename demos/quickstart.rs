use chrono::Utc;
use site_events::{compile_site_events, zone, CalibrationDurations, Ephemeris};

fn main() -> Result<(), site_events::EventsError> {
    let now = Utc::now().timestamp() as f64;
    let tz = zone::parse_timezone("America/Los_Angeles")?;
    let night = compile_site_events(
        Ephemeris::shared(),
        34.0,
        -119.0,
        now,
        "America/Los_Angeles",
        &CalibrationDurations::default(),
    )?;

    println!("Night: {}", night.window);
    for (name, t) in night.timeline.iter() {
        let local = zone::to_local(t, &tz)?;
        println!("{name:>25}  {}  {:.6}", local.format("%Y-%m-%d %H:%M:%S %Z"), t.value());
    }
    println!(
        "Evening flats: {:.3}h {:+.2}° drifting {:+.4} °/h RA, {:+.4} °/h Dec",
        night.evening_flats.start_ra,
        night.evening_flats.start_dec,
        night.evening_flats.ra_rate,
        night.evening_flats.dec_rate
    );
    println!("Moon illumination at transit: {:.2}", night.moon.illumination);
    Ok(())
}
