use chrono::{DateTime, Days, TimeDelta, TimeZone, Utc};

/// Lowest ease factor the scheduler will ever produce
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor given to items that were never reviewed
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Recall quality of a single attempt, on the SM-2 scale 0..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    /// Total failure
    pub const BLACKOUT: Quality = Quality(0);
    /// Wrong, but close enough to be a useful signal
    pub const NEAR_MISS: Quality = Quality(2);
    /// Lowest passing grade
    pub const PASS: Quality = Quality(3);
    /// Perfect recall
    pub const PERFECT: Quality = Quality(5);

    /// Creates a quality rating, clamping the raw value into 0..=5
    pub fn new(raw: i32) -> Self {
        Quality(raw.clamp(0, 5) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Ratings of 3 and above keep the streak alive
    pub fn is_pass(self) -> bool {
        self >= Self::PASS
    }

    pub fn describe(self) -> &'static str {
        match self.0 {
            0 => "Grade0 (Blackout)",
            1 => "Grade1 (Wrong)",
            2 => "Grade2 (Near miss)",
            3 => "Grade3 (Serious difficulty)",
            4 => "Grade4 (After hesitation)",
            _ => "Grade5 (Perfect)",
        }
    }
}

/// Scheduling record for one item in one game mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasteryState {
    /// Epoch milliseconds after which the item is due
    pub next_review_date: i64,
    /// Days between the last review and the next one
    pub interval: i32,
    pub ease_factor: f64,
    /// Consecutive passing reviews
    pub successful_reviews: u32,
}

impl Default for MasteryState {
    fn default() -> Self {
        Self {
            next_review_date: 0,
            interval: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            successful_reviews: 0,
        }
    }
}

impl MasteryState {
    pub fn is_due(&self, now_millis: i64) -> bool {
        self.next_review_date <= now_millis
    }
}

/// SM-2 variant used by the quiz
///
/// Failing an item resets the streak and interval but leaves the ease factor
/// alone. For the third and later passes the interval grows by the ease
/// factor *after* it has been updated for the current answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewScheduler;

impl ReviewScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Computes the mastery state that follows `state` after an answer of `quality` at `now`
    ///
    /// The next review is `interval` calendar days after `now` in the time zone of `now`.
    pub fn advance<Tz: TimeZone>(
        &self,
        state: &MasteryState,
        quality: Quality,
        now: &DateTime<Tz>,
    ) -> MasteryState {
        let (successful_reviews, interval, ease_factor) = if quality.is_pass() {
            let streak = state.successful_reviews + 1;
            let ease = updated_ease_factor(state.ease_factor, quality);
            let interval = match streak {
                1 => 1,
                2 => 6,
                _ => ((state.interval as f64 * ease).round() as i32).max(1),
            };
            (streak, interval, ease)
        } else {
            (0, 1, state.ease_factor)
        };

        MasteryState {
            next_review_date: next_review_millis(now, interval),
            interval,
            ease_factor,
            successful_reviews,
        }
    }
}

/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3
pub fn updated_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    let distance = 5.0 - quality.value() as f64;
    let ease = ease_factor + (0.1 - distance * (0.08 + distance * 0.02));
    ease.max(MIN_EASE_FACTOR)
}

/// Epoch millis `days` calendar days after `now`, saturating at the latest representable instant
fn next_review_millis<Tz: TimeZone>(now: &DateTime<Tz>, days: i32) -> i64 {
    let days = days.max(0);
    now.clone()
        .checked_add_days(Days::new(days as u64))
        // wall-clock time missing or ambiguous on the target day
        .or_else(|| {
            now.clone()
                .checked_add_signed(TimeDelta::try_days(days as i64)?)
        })
        .map(|next| next.timestamp_millis())
        .unwrap_or(DateTime::<Utc>::MAX_UTC.timestamp_millis())
}
