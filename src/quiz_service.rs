use crate::answer_evaluator::{evaluate_choice, evaluate_location};
use crate::database::Database;
use crate::distractors::{
    DEFAULT_DISTRACTOR_COUNT, assemble_options, nearby_bounds, select_distractors,
};
use crate::error::{QuizError, Result};
use crate::geometry::GeoPoint;
use crate::quiz_item::{GameMode, QuizItem};
use crate::spaced_repetition::{MasteryState, Quality, ReviewScheduler};
use crate::time_format::format_time_difference;
use chrono::{DateTime, Local, SubsecRound, TimeZone};
use log::info;
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Zoom level used when an item has no display hint
pub const DEFAULT_ZOOM: f64 = 15.0;

/// Nearby items fetched before distractors are sampled
pub const DISTRACTOR_POOL_LIMIT: usize = 50;

/// How a question is asked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// Place highlighted on the map, user picks its name
    ShowName,
    /// Name given, user taps the map
    NamePoke,
    /// Photo shown, user picks its name
    ImageGuess,
}

impl QuestionKind {
    pub fn game_mode(&self) -> GameMode {
        match self {
            QuestionKind::ShowName | QuestionKind::NamePoke => GameMode::Map,
            QuestionKind::ImageGuess => GameMode::Image,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Question {
    pub item: QuizItem,
    pub kind: QuestionKind,
    /// Shuffled names for multiple choice; empty for map taps
    pub options: Vec<String>,
    pub initial_zoom: f64,
}

impl Question {
    pub fn new(item: QuizItem, kind: QuestionKind, options: Vec<String>) -> Self {
        let initial_zoom = if item.min_zoom > 0.0 {
            item.min_zoom
        } else {
            DEFAULT_ZOOM
        };
        Self {
            item,
            kind,
            options,
            initial_zoom,
        }
    }
}

/// Result of answering a single question
#[derive(Debug, Clone, PartialEq)]
pub struct QuizOutcome {
    pub item_id: String,
    pub kind: QuestionKind,
    pub success: bool,
    pub quality: Quality,
    pub correct_location: GeoPoint,
    pub user_location: Option<GeoPoint>,
    /// Meters from the tap to the item; map taps only
    pub distance: Option<f64>,
    pub allowed_radius: Option<f64>,
    /// Mastery record of the question's game mode after scheduling
    pub mastery: MasteryState,
    /// Instant the review was scheduled from, in whole milliseconds
    pub reviewed_at: DateTime<Local>,
    pub message: String,
}

/// Service layer for quiz sessions, decoupled from any front end
pub struct QuizService<R: Rng> {
    db: Arc<Database>,
    scheduler: ReviewScheduler,
    rng: R,
}

impl<R: Rng> QuizService<R> {
    pub fn new(db: Arc<Database>, rng: R) -> Self {
        Self {
            db,
            scheduler: ReviewScheduler::new(),
            rng,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Picks a random due item for `game_mode` and builds a question for it
    ///
    /// Returns `None` when nothing is due.
    pub fn next_question(&mut self, game_mode: GameMode) -> Result<Option<Question>> {
        let due = self.db.get_due_items(game_mode)?;
        let total_due = due.len();
        let candidates: Vec<QuizItem> = match game_mode {
            GameMode::Image => due
                .into_iter()
                .filter(|item| item.image_name.is_some())
                .collect(),
            GameMode::Map => due,
        };

        info!(
            "Due items: {}, usable for {} mode: {}",
            total_due,
            game_mode.as_str(),
            candidates.len()
        );

        let Some(item) = candidates.choose(&mut self.rng).cloned() else {
            return Ok(None);
        };

        let kind = match game_mode {
            GameMode::Image => QuestionKind::ImageGuess,
            GameMode::Map if self.rng.gen_bool(0.5) => QuestionKind::ShowName,
            GameMode::Map => QuestionKind::NamePoke,
        };

        let options = match kind {
            QuestionKind::NamePoke => Vec::new(),
            QuestionKind::ShowName | QuestionKind::ImageGuess => self.options_for(&item)?,
        };

        Ok(Some(Question::new(item, kind, options)))
    }

    fn options_for(&mut self, item: &QuizItem) -> Result<Vec<String>> {
        let pool = self.db.get_nearby_quiz_items(
            item.geometry_type,
            &item.id,
            &nearby_bounds(item),
            DISTRACTOR_POOL_LIMIT,
        )?;
        let distractors = select_distractors(item, &pool, DEFAULT_DISTRACTOR_COUNT, &mut self.rng);
        Ok(assemble_options(distractors, &item.name, &mut self.rng))
    }

    /// Grades a multiple choice answer by exact name match
    pub fn submit_choice(&mut self, question: &Question, selected_name: &str) -> Result<QuizOutcome> {
        let quality = evaluate_choice(&question.item, selected_name);
        let success = quality.is_pass();
        let (item, now) = self.review(&question.item.id, question.kind.game_mode(), quality)?;

        let message = if success {
            "Correct!".to_string()
        } else {
            format!("Incorrect. It was {}", item.name)
        };
        self.log_review(&item, question.kind, quality, &now);

        Ok(QuizOutcome {
            item_id: item.id.clone(),
            kind: question.kind,
            success,
            quality,
            correct_location: item.anchor(),
            user_location: None,
            distance: None,
            allowed_radius: None,
            mastery: *item.mastery(question.kind.game_mode()),
            reviewed_at: now,
            message,
        })
    }

    /// Grades a map tap against the item's shape and adaptive radius
    pub fn submit_location(&mut self, question: &Question, point: GeoPoint) -> Result<QuizOutcome> {
        let current = self.load(&question.item.id)?;
        let verdict = evaluate_location(point, &current);
        let success = verdict.is_success();
        let (item, now) = self.review(&current.id, GameMode::Map, verdict.quality)?;

        let message = format!(
            "Distance: {}m (Limit: {}m). {}",
            verdict.distance as i64,
            verdict.allowed_radius as i64,
            if success { "Great!" } else { "Too far!" }
        );
        self.log_review(&item, question.kind, verdict.quality, &now);

        Ok(QuizOutcome {
            item_id: item.id.clone(),
            kind: question.kind,
            success,
            quality: verdict.quality,
            correct_location: item.anchor(),
            user_location: Some(point),
            distance: Some(verdict.distance),
            allowed_radius: Some(verdict.allowed_radius),
            mastery: item.map_mastery,
            reviewed_at: now,
            message,
        })
    }

    fn load(&self, item_id: &str) -> Result<QuizItem> {
        self.db
            .get_quiz_item(item_id)?
            .ok_or_else(|| QuizError::ItemNotFound(item_id.to_string()))
    }

    /// Re-reads the item, advances one mastery record and persists it
    fn review(
        &self,
        item_id: &str,
        mode: GameMode,
        quality: Quality,
    ) -> Result<(QuizItem, DateTime<Local>)> {
        let mut item = self.load(item_id)?;
        // stored review dates have millisecond resolution
        let now = self.db.current_time().trunc_subsecs(3);
        let next = self.scheduler.advance(item.mastery(mode), quality, &now);
        item.set_mastery(mode, next);
        self.db.save_quiz_item(&item)?;
        Ok((item, now))
    }

    fn log_review(&self, item: &QuizItem, kind: QuestionKind, quality: Quality, now: &DateTime<Local>) {
        let mastery = item.mastery(kind.game_mode());
        info!(
            "Review: {} ({:?}) | Quality: {} | Next review: {} | Streak: {}, Interval: {} days, Ease: {:.2}",
            item.name,
            kind,
            quality.describe(),
            format_time_difference(*now, next_review_time(mastery, now)),
            mastery.successful_reviews,
            mastery.interval,
            mastery.ease_factor
        );
    }
}

/// Local time of a mastery record's next review, falling back to `now`
pub fn next_review_time(mastery: &MasteryState, now: &DateTime<Local>) -> DateTime<Local> {
    Local
        .timestamp_millis_opt(mastery.next_review_date)
        .single()
        .unwrap_or(*now)
}
