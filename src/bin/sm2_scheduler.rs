use chrono::{DateTime, SubsecRound, Utc};
use map_quiz::spaced_repetition::{MasteryState, Quality, ReviewScheduler};
use map_quiz::time_format::format_time_difference;
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();

    let (successful_reviews, interval, ease_factor) = validate_input(args);

    let scheduler = ReviewScheduler::new();
    // review dates are kept in whole milliseconds
    let now = Utc::now().trunc_subsecs(3);

    let state = MasteryState {
        next_review_date: now.timestamp_millis(),
        interval,
        ease_factor,
        successful_reviews,
    };

    println!(
        "SM-2 scheduling for: streak={}, interval={}, ease={:.2}",
        successful_reviews, interval, ease_factor
    );

    for grade in 0..=5 {
        compute_and_print(&scheduler, &state, now, Quality::new(grade));
    }
}

fn validate_input(args: Vec<String>) -> (u32, i32, f64) {
    if args.len() != 4 {
        eprintln!(
            "Usage: {} <successful_reviews> <interval> <ease_factor>",
            args[0]
        );
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  <successful_reviews>  Current streak of passing reviews (non-negative integer)");
        eprintln!("  <interval>            Current interval in days (non-negative integer)");
        eprintln!("  <ease_factor>         Current ease factor (floating point, 1.3 or higher)");
        eprintln!();
        eprintln!("Example: {} 2 6 2.5", args[0]);
        std::process::exit(1);
    }

    let successful_reviews: u32 = match args[1].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("Error: successful_reviews must be a non-negative integer");
            std::process::exit(1);
        }
    };

    let interval: i32 = match args[2].parse() {
        Ok(n) if n >= 0 => n,
        _ => {
            eprintln!("Error: interval must be a non-negative integer");
            std::process::exit(1);
        }
    };

    let ease_factor: f64 = match args[3].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("Error: ease_factor must be a valid floating point number");
            std::process::exit(1);
        }
    };
    (successful_reviews, interval, ease_factor)
}

fn compute_and_print(
    scheduler: &ReviewScheduler,
    state: &MasteryState,
    now: DateTime<Utc>,
    quality: Quality,
) {
    let next = scheduler.advance(state, quality, &now);
    let next_date = DateTime::from_timestamp_millis(next.next_review_date).unwrap_or(now);

    println!(
        "Grade: {} | Next review: {} | Streak: {} | Interval: {} | Ease: {:.2}",
        quality.describe(),
        format_time_difference(now, next_date),
        next.successful_reviews,
        next.interval,
        next.ease_factor
    );
}
