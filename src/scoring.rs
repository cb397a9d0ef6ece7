//! Verdicts for the three round kinds. Everything here is pure: records are
//! fetched by the caller, and persistence happens afterwards from the
//! returned outcome.

use crate::error::Error;
use crate::model::Image;
use crate::types::CategoryCount;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// What one graded round decided: the verdict, the row ids of every image
/// that was asked (in presentation order), and the probe labels that made it
/// through the feedback gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub is_correct: bool,
    pub image_ids: Vec<i32>,
    pub feedback: Vec<(Uuid, String)>,
}

impl RoundOutcome {
    /// The feedback gate: an incorrect round never carries probe labels out,
    /// whatever the policy collected along the way.
    fn gated(is_correct: bool, image_ids: Vec<i32>, candidates: Vec<(Uuid, String)>) -> Self {
        let feedback = if is_correct { candidates } else { Vec::new() };
        RoundOutcome {
            is_correct,
            image_ids,
            feedback,
        }
    }
}

/// Explicit-category selection (grid of 9). Correct means the selected
/// indices that land on the asked category are exactly the indices holding
/// that category; probes and off-category selections never sway the verdict.
/// Every probe the user grouped with the category becomes a feedback
/// candidate.
pub fn score_selection(
    echoed: &[Uuid],
    selected: &HashSet<usize>,
    category_asked: &str,
    records: &HashMap<Uuid, Image>,
) -> Result<RoundOutcome, Error> {
    if let Some(&idx) = selected.iter().find(|&&i| i >= echoed.len()) {
        return Err(Error::Validation(format!(
            "selected index {idx} is outside the {}-image grid",
            echoed.len()
        )));
    }

    let mut image_ids = Vec::with_capacity(echoed.len());
    let mut correct_indices = HashSet::new();
    for (i, id) in echoed.iter().enumerate() {
        let record = records.get(id).ok_or(Error::NotFound(*id))?;
        image_ids.push(record.id);
        if record.label == category_asked {
            correct_indices.insert(i);
        }
    }

    let selected_classified: HashSet<usize> = selected
        .iter()
        .copied()
        .filter(|&i| records[&echoed[i]].label == category_asked)
        .collect();
    let is_correct = selected_classified == correct_indices;

    let candidates = selected
        .iter()
        .map(|&i| &records[&echoed[i]])
        .filter(|record| record.is_unclassified())
        .map(|record| (record.uuid, category_asked.to_string()))
        .collect();
    Ok(RoundOutcome::gated(is_correct, image_ids, candidates))
}

/// Per-image labeling (grid of 5, one probe). The probe position is exempt
/// from scoring and remembered with the user's answer; all other positions
/// must match.
pub fn score_labeling(records: &[Image], answers: &[String]) -> Result<RoundOutcome, Error> {
    if answers.len() != records.len() {
        return Err(Error::Validation(format!(
            "expected {} answers, got {}",
            records.len(),
            answers.len()
        )));
    }

    let mut correct = 0usize;
    let mut probe = None;
    for (record, answer) in records.iter().zip(answers) {
        if record.is_unclassified() {
            probe = Some((record.uuid, answer.clone()));
        } else if record.label == *answer {
            correct += 1;
        }
    }
    let is_correct = correct + 1 >= records.len();

    let image_ids = records.iter().map(|record| record.id).collect();
    Ok(RoundOutcome::gated(
        is_correct,
        image_ids,
        probe.into_iter().collect(),
    ))
}

/// Category-count estimation (grid of 16, one probe). The probe is excluded
/// from the true counts, so a careful user overshoots exactly one category by
/// one; that category is taken as the probe's label. One unit of total error
/// is allowed for the same reason.
pub fn score_counting(
    records: &[Image],
    known_categories: &[String],
    answers: &[CategoryCount],
) -> Result<RoundOutcome, Error> {
    let mut true_counts: HashMap<&str, i64> = known_categories
        .iter()
        .map(|category| (category.as_str(), 0))
        .collect();
    for record in records.iter().filter(|record| !record.is_unclassified()) {
        if let Some(count) = true_counts.get_mut(record.label.as_str()) {
            *count += 1;
        }
    }

    let mut error = 0i64;
    let mut inferred = None;
    for answer in answers {
        let Some(&true_count) = true_counts.get(answer.category.as_str()) else {
            return Err(Error::Validation(format!(
                "unknown category {:?}",
                answer.category
            )));
        };
        error += (true_count - answer.amount).abs();
        if answer.amount == true_count + 1 {
            inferred = Some(answer.category.clone());
        }
    }
    let is_correct = error <= 1;

    let candidates = match inferred {
        Some(category) => records
            .iter()
            .filter(|record| record.is_unclassified())
            .map(|record| (record.uuid, category.clone()))
            .collect(),
        None => Vec::new(),
    };
    let image_ids = records.iter().map(|record| record.id).collect();
    Ok(RoundOutcome::gated(is_correct, image_ids, candidates))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: i32, label: &str) -> Image {
        Image {
            id,
            uuid: Uuid::from_u128(id as u128),
            path: format!("/img/{id}.jpg"),
            label: label.to_string(),
            source: None,
        }
    }

    fn grid(labels: &[&str]) -> (Vec<Uuid>, HashMap<Uuid, Image>) {
        let records: Vec<Image> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| image(i as i32 + 1, label))
            .collect();
        let echoed = records.iter().map(|r| r.uuid).collect();
        let by_uuid = records.into_iter().map(|r| (r.uuid, r)).collect();
        (echoed, by_uuid)
    }

    fn indices(values: &[usize]) -> HashSet<usize> {
        values.iter().copied().collect()
    }

    #[test]
    fn selection_exact_match_is_correct() {
        let (echoed, records) = grid(&[
            "glass",
            "metal",
            "glass",
            "unclassified",
            "paper",
            "unclassified",
        ]);
        let outcome = score_selection(&echoed, &indices(&[0, 2]), "glass", &records).unwrap();
        assert!(outcome.is_correct);
        assert!(outcome.feedback.is_empty());
        assert_eq!(outcome.image_ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn selection_probes_never_flip_the_verdict() {
        let (echoed, records) = grid(&["glass", "metal", "glass", "unclassified", "paper"]);
        // probe selected alongside the right answers
        let outcome = score_selection(&echoed, &indices(&[0, 2, 3]), "glass", &records).unwrap();
        assert!(outcome.is_correct);
        assert_eq!(
            outcome.feedback,
            vec![(Uuid::from_u128(4), "glass".to_string())]
        );
        // probe ignored entirely
        let outcome = score_selection(&echoed, &indices(&[0, 2]), "glass", &records).unwrap();
        assert!(outcome.is_correct);
        assert!(outcome.feedback.is_empty());
    }

    #[test]
    fn selection_extra_wrong_category_fails() {
        let (echoed, records) = grid(&["glass", "metal", "glass", "unclassified", "paper"]);
        let outcome = score_selection(&echoed, &indices(&[0, 1, 2]), "glass", &records).unwrap();
        assert!(!outcome.is_correct);
        assert!(outcome.feedback.is_empty());
    }

    #[test]
    fn selection_missed_image_fails() {
        let (echoed, records) = grid(&["glass", "metal", "glass", "unclassified", "paper"]);
        let outcome = score_selection(&echoed, &indices(&[0]), "glass", &records).unwrap();
        assert!(!outcome.is_correct);
    }

    #[test]
    fn selection_incorrect_round_discards_probe_selection() {
        let (echoed, records) = grid(&["glass", "metal", "glass", "unclassified", "paper"]);
        // probe selected, but one glass image missed
        let outcome = score_selection(&echoed, &indices(&[0, 3]), "glass", &records).unwrap();
        assert!(!outcome.is_correct);
        assert!(outcome.feedback.is_empty());
    }

    #[test]
    fn selection_dangling_uuid_is_not_found() {
        let (echoed, mut records) = grid(&["glass", "metal"]);
        records.remove(&echoed[1]);
        let err = score_selection(&echoed, &indices(&[0]), "glass", &records).unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == echoed[1]));
    }

    #[test]
    fn selection_out_of_range_index_is_rejected() {
        let (echoed, records) = grid(&["glass", "metal"]);
        let err = score_selection(&echoed, &indices(&[5]), "glass", &records).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    fn labeling_grid() -> Vec<Image> {
        vec![
            image(1, "glass"),
            image(2, "unclassified"),
            image(3, "metal"),
            image(4, "paper"),
            image(5, "glass"),
        ]
    }

    fn answers(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn labeling_probe_answer_is_free_and_collected() {
        let outcome = score_labeling(
            &labeling_grid(),
            &answers(&["glass", "anything", "metal", "paper", "glass"]),
        )
        .unwrap();
        assert!(outcome.is_correct);
        assert_eq!(
            outcome.feedback,
            vec![(Uuid::from_u128(2), "anything".to_string())]
        );
        assert_eq!(outcome.image_ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn labeling_one_wrong_filler_fails_and_discards_probe() {
        let outcome = score_labeling(
            &labeling_grid(),
            &answers(&["glass", "metal", "metal", "glass", "glass"]),
        )
        .unwrap();
        assert!(!outcome.is_correct);
        assert!(outcome.feedback.is_empty());
    }

    #[test]
    fn labeling_wrong_length_is_rejected() {
        let err = score_labeling(&labeling_grid(), &answers(&["glass", "metal"])).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    fn counting_grid() -> Vec<Image> {
        let mut records = vec![image(99, "unclassified")];
        for id in 1..=3 {
            records.push(image(id, "cardboard"));
        }
        for id in 4..=5 {
            records.push(image(id, "metal"));
        }
        records
    }

    fn counts(values: &[(&str, i64)]) -> Vec<CategoryCount> {
        values
            .iter()
            .map(|(category, amount)| CategoryCount {
                category: category.to_string(),
                amount: *amount,
            })
            .collect()
    }

    fn known() -> Vec<String> {
        vec![
            "cardboard".to_string(),
            "metal".to_string(),
            "glass".to_string(),
        ]
    }

    #[test]
    fn counting_one_over_infers_the_probe_category() {
        let outcome = score_counting(
            &counting_grid(),
            &known(),
            &counts(&[("cardboard", 4), ("metal", 2), ("glass", 0)]),
        )
        .unwrap();
        assert!(outcome.is_correct);
        assert_eq!(
            outcome.feedback,
            vec![(Uuid::from_u128(99), "cardboard".to_string())]
        );
    }

    #[test]
    fn counting_error_of_two_fails() {
        let outcome = score_counting(
            &counting_grid(),
            &known(),
            &counts(&[("cardboard", 4), ("metal", 3), ("glass", 0)]),
        )
        .unwrap();
        assert!(!outcome.is_correct);
        assert!(outcome.feedback.is_empty());
    }

    #[test]
    fn counting_exact_counts_pass_without_feedback() {
        // The user never counted the probe anywhere, so there is nothing to
        // infer even though the round passes.
        let outcome = score_counting(
            &counting_grid(),
            &known(),
            &counts(&[("cardboard", 3), ("metal", 2), ("glass", 0)]),
        )
        .unwrap();
        assert!(outcome.is_correct);
        assert!(outcome.feedback.is_empty());
    }

    #[test]
    fn counting_unknown_category_is_rejected() {
        let err = score_counting(&counting_grid(), &known(), &counts(&[("plastic", 1)]))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
