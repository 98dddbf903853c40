use crate::geometry::BoundingBox;
use crate::quiz_item::QuizItem;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Half-width in degrees of the "nearby" box, roughly 5 km
pub const NEARBY_DELTA_DEGREES: f64 = 0.05;

/// Wrong options shown next to the correct name
pub const DEFAULT_DISTRACTOR_COUNT: usize = 3;

/// Box around the target's anchor in which distractors are looked up
pub fn nearby_bounds(target: &QuizItem) -> BoundingBox {
    BoundingBox::around(target.anchor(), NEARBY_DELTA_DEGREES)
}

/// Picks up to `count` wrong names among `candidates`
///
/// Candidates must share the target's geometry type, lie in its nearby box
/// and carry a different id and name. Names are deduplicated before sampling
/// so the same label never appears twice.
pub fn select_distractors<R: Rng + ?Sized>(
    target: &QuizItem,
    candidates: &[QuizItem],
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let bounds = nearby_bounds(target);
    let mut seen = HashSet::new();

    let names: Vec<&str> = candidates
        .iter()
        .filter(|c| {
            c.geometry_type == target.geometry_type
                && c.id != target.id
                && c.name != target.name
                && bounds.contains(c.anchor())
        })
        .map(|c| c.name.as_str())
        .filter(|name| seen.insert(*name))
        .collect();

    names
        .choose_multiple(rng, count)
        .map(|name| name.to_string())
        .collect()
}

/// Distractors plus the correct name, in random order
pub fn assemble_options<R: Rng + ?Sized>(
    distractors: Vec<String>,
    correct_name: &str,
    rng: &mut R,
) -> Vec<String> {
    let mut options = distractors;
    options.push(correct_name.to_string());
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz_item::GeometryType;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn target() -> QuizItem {
        QuizItem::new("cathedral", "Cathedral", 55.73, 36.85)
    }

    fn candidates() -> Vec<QuizItem> {
        let mut street = QuizItem::new("street", "Main street", 55.731, 36.851);
        street.geometry_type = GeometryType::Line;

        vec![
            QuizItem::new("museum", "Museum", 55.74, 36.86),
            QuizItem::new("school", "School", 55.72, 36.84),
            QuizItem::new("park", "Park", 55.735, 36.855),
            QuizItem::new("park-2", "Park", 55.736, 36.856),
            QuizItem::new("library", "Library", 55.729, 36.849),
            // wrong type
            street,
            // same name as the target
            QuizItem::new("cathedral-east", "Cathedral", 55.73, 36.86),
            // the target itself
            target(),
            // outside the box
            QuizItem::new("far-station", "Station", 55.9, 36.85),
        ]
    }

    #[test]
    fn test_selects_requested_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = select_distractors(&target(), &candidates(), 3, &mut rng);
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn test_excludes_ineligible_candidates() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = select_distractors(&target(), &candidates(), 10, &mut rng);

        let mut sorted = picked.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["Library", "Museum", "Park", "School"]);
    }

    #[test]
    fn test_no_duplicate_names() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = select_distractors(&target(), &candidates(), 4, &mut rng);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), picked.len());
        }
    }

    #[test]
    fn test_same_seed_same_selection() {
        let first = select_distractors(
            &target(),
            &candidates(),
            2,
            &mut StdRng::seed_from_u64(99),
        );
        let second = select_distractors(
            &target(),
            &candidates(),
            2,
            &mut StdRng::seed_from_u64(99),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_candidates_gives_no_distractors() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_distractors(&target(), &[], 3, &mut rng).is_empty());
    }

    #[test]
    fn test_assemble_options_contains_correct_name_once() {
        let mut rng = StdRng::seed_from_u64(3);
        let options = assemble_options(
            vec!["Museum".to_string(), "Park".to_string()],
            "Cathedral",
            &mut rng,
        );

        assert_eq!(options.len(), 3);
        assert_eq!(options.iter().filter(|o| *o == "Cathedral").count(), 1);
        assert!(options.contains(&"Museum".to_string()));
        assert!(options.contains(&"Park".to_string()));
    }
}
