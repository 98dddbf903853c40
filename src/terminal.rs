use crate::error::Result;
use crate::geometry::GeoPoint;
use crate::quiz_item::GameMode;
use crate::quiz_service::{Question, QuestionKind, QuizOutcome, QuizService, next_review_time};
use crate::session::SessionSummary;
use crate::time_format::format_time_difference;
use colored::Colorize;
use log::debug;
use rand::Rng;
use std::io::{BufRead, Write};

/// What the player typed for one question
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerAnswer {
    Choice(String),
    Location(GeoPoint),
    Quit,
}

/// Interprets a line of input for `question`; `None` means try again
pub fn parse_answer(question: &Question, line: &str) -> Option<PlayerAnswer> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Some(PlayerAnswer::Quit);
    }
    if line.is_empty() {
        return None;
    }

    match question.kind {
        QuestionKind::NamePoke => parse_location(line).map(PlayerAnswer::Location),
        QuestionKind::ShowName | QuestionKind::ImageGuess => {
            if let Ok(number) = line.parse::<usize>() {
                return number
                    .checked_sub(1)
                    .and_then(|idx| question.options.get(idx))
                    .map(|name| PlayerAnswer::Choice(name.clone()));
            }
            let name = question
                .options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(line))
                .cloned()
                .unwrap_or_else(|| line.to_string());
            Some(PlayerAnswer::Choice(name))
        }
    }
}

/// Parses "lat,lon" in decimal degrees
pub fn parse_location(line: &str) -> Option<GeoPoint> {
    let (lat, lon) = line.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some(GeoPoint::new(lat, lon))
}

fn print_question<W: Write>(output: &mut W, number: usize, question: &Question) -> Result<()> {
    writeln!(output)?;
    writeln!(
        output,
        "{} {}",
        format!("Question {}", number).bold().cyan(),
        format!("(zoom {:.0})", question.initial_zoom).dimmed()
    )?;

    match question.kind {
        QuestionKind::ShowName => {
            let anchor = question.item.anchor();
            writeln!(
                output,
                "  Which place is highlighted at {:.5}, {:.5}?",
                anchor.lat, anchor.lon
            )?;
        }
        QuestionKind::ImageGuess => {
            let image = question.item.image_name.as_deref().unwrap_or_default();
            writeln!(output, "  Which place is shown in {}?", image.yellow())?;
        }
        QuestionKind::NamePoke => {
            writeln!(
                output,
                "  Where is {}? Answer with lat,lon",
                question.item.name.bold()
            )?;
        }
    }

    for (idx, option) in question.options.iter().enumerate() {
        writeln!(output, "  {}. {}", idx + 1, option)?;
    }
    write!(output, "{} ", ">".bold())?;
    output.flush()?;
    Ok(())
}

fn print_outcome<W: Write>(output: &mut W, outcome: &QuizOutcome) -> Result<()> {
    let marker = if outcome.success {
        "✓".green()
    } else {
        "✗".red()
    };
    let message = if outcome.success {
        outcome.message.green()
    } else {
        outcome.message.red()
    };
    writeln!(output, "{} {}", marker, message)?;
    writeln!(
        output,
        "  Next review: {}",
        format_time_difference(
            outcome.reviewed_at,
            next_review_time(&outcome.mastery, &outcome.reviewed_at)
        )
        .dimmed()
    )?;
    Ok(())
}

/// Prints accuracy totals for the finished session
pub fn print_summary<W: Write>(output: &mut W, summary: &SessionSummary) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "{}", "Session summary".bold())?;
    writeln!(
        output,
        "  Correct: {} / {} ({:.1}%)",
        summary.correct_answers.to_string().green(),
        summary.total_questions,
        summary.accuracy_percentage
    )?;
    writeln!(
        output,
        "  Incorrect: {}",
        summary.incorrect_answers.to_string().red()
    )?;
    if let Some(distance) = summary.average_distance_m {
        writeln!(output, "  Average tap distance: {:.0}m", distance)?;
    }
    Ok(())
}

/// Asks up to `max_questions` due questions, reading answers from `input`
///
/// Stops early when nothing is due, on "q", or at end of input.
pub fn run_session<R, I, W>(
    service: &mut QuizService<R>,
    game_mode: GameMode,
    max_questions: usize,
    input: &mut I,
    output: &mut W,
) -> Result<SessionSummary>
where
    R: Rng,
    I: BufRead,
    W: Write,
{
    let mut outcomes = Vec::new();

    'questions: for number in 1..=max_questions {
        let Some(question) = service.next_question(game_mode)? else {
            if number == 1 {
                writeln!(output, "{}", "Nothing is due for review".yellow())?;
            }
            break;
        };
        print_question(output, number, &question)?;

        let answer = loop {
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                debug!("Input closed, ending session");
                break 'questions;
            }
            match parse_answer(&question, &line) {
                Some(answer) => break answer,
                None => {
                    let hint = match question.kind {
                        QuestionKind::NamePoke => "Enter coordinates as lat,lon",
                        _ => "Enter an option number or name",
                    };
                    write!(output, "{} {} ", hint.dimmed(), ">".bold())?;
                    output.flush()?;
                }
            }
        };

        let outcome = match answer {
            PlayerAnswer::Quit => break,
            PlayerAnswer::Choice(name) => service.submit_choice(&question, &name)?,
            PlayerAnswer::Location(point) => service.submit_location(&question, point)?,
        };
        print_outcome(output, &outcome)?;
        outcomes.push(outcome);
    }

    let summary = SessionSummary::from_outcomes(&outcomes);
    if summary.total_questions > 0 {
        print_summary(output, &summary)?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz_item::QuizItem;

    fn question(kind: QuestionKind) -> Question {
        Question::new(
            QuizItem::new("tower", "Water tower", 55.73, 36.85),
            kind,
            vec!["School".to_string(), "Water tower".to_string()],
        )
    }

    #[test]
    fn test_parse_option_number() {
        let q = question(QuestionKind::ShowName);
        assert_eq!(
            parse_answer(&q, "2\n"),
            Some(PlayerAnswer::Choice("Water tower".to_string()))
        );
        assert_eq!(parse_answer(&q, "0"), None);
        assert_eq!(parse_answer(&q, "3"), None);
    }

    #[test]
    fn test_parse_option_name_ignores_case() {
        let q = question(QuestionKind::ImageGuess);
        assert_eq!(
            parse_answer(&q, "school"),
            Some(PlayerAnswer::Choice("School".to_string()))
        );
        assert_eq!(
            parse_answer(&q, "Church"),
            Some(PlayerAnswer::Choice("Church".to_string()))
        );
    }

    #[test]
    fn test_parse_quit_and_blank() {
        let q = question(QuestionKind::NamePoke);
        assert_eq!(parse_answer(&q, "Q"), Some(PlayerAnswer::Quit));
        assert_eq!(parse_answer(&q, "   "), None);
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(
            parse_location("55.73, 36.85"),
            Some(GeoPoint::new(55.73, 36.85))
        );
        assert_eq!(parse_location("55.73"), None);
        assert_eq!(parse_location("north,36.85"), None);
        assert_eq!(parse_location("95.0,36.85"), None);
    }

    #[test]
    fn test_poke_question_rejects_plain_text() {
        let q = question(QuestionKind::NamePoke);
        assert_eq!(parse_answer(&q, "Water tower"), None);
        assert_eq!(
            parse_answer(&q, "55.7,36.8"),
            Some(PlayerAnswer::Location(GeoPoint::new(55.7, 36.8)))
        );
    }
}
