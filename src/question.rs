//! Grid assembly for the three question kinds. Sampling happens in the
//! store; this module only mixes probes into the filler set and fixes the
//! presentation order the client will echo back.

use crate::error::Error;
use crate::model::Image;
use crate::types::ImageInfo;
use rand::seq::SliceRandom;
use rand::Rng;

pub const SELECTION_GRID: i64 = 9;
pub const SELECTION_PROBES: i64 = 3;
pub const LABELING_GRID: i64 = 5;
pub const COUNTING_GRID: i64 = 16;

/// Uniform pick of the category a selection round asks about. A store with
/// no classified labels cannot ask anything.
pub fn pick_category<R: Rng>(categories: &[String], rng: &mut R) -> Result<String, Error> {
    categories.choose(rng).cloned().ok_or(Error::Configuration)
}

/// Probes and fillers shuffled together; the resulting positions are the
/// index space submissions refer to.
pub fn compose_grid<R: Rng>(probes: Vec<Image>, fillers: Vec<Image>, rng: &mut R) -> Vec<Image> {
    let mut grid = probes;
    grid.extend(fillers);
    grid.shuffle(rng);
    grid
}

pub fn to_wire(grid: &[Image]) -> Vec<ImageInfo> {
    grid.iter()
        .enumerate()
        .map(|(index, record)| ImageInfo {
            uuid: record.uuid,
            url: record.path.clone(),
            index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn image(id: i32, label: &str) -> Image {
        Image {
            id,
            uuid: Uuid::from_u128(id as u128),
            path: format!("/img/{id}.jpg"),
            label: label.to_string(),
            source: None,
        }
    }

    #[test]
    fn no_classified_labels_is_a_configuration_error() {
        let err = pick_category(&[], &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, Error::Configuration));
    }

    #[test]
    fn picked_category_comes_from_the_known_set() {
        let categories = vec!["glass".to_string(), "metal".to_string()];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            let category = pick_category(&categories, &mut rng).unwrap();
            assert!(categories.contains(&category));
        }
    }

    #[test]
    fn compose_grid_is_a_permutation() {
        let probes = vec![image(1, "unclassified"), image(2, "unclassified")];
        let fillers = vec![image(3, "glass"), image(4, "metal"), image(5, "paper")];
        let mut rng = StdRng::seed_from_u64(7);
        let grid = compose_grid(probes, fillers, &mut rng);
        assert_eq!(grid.len(), 5);
        let ids: HashSet<i32> = grid.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=5).collect());
    }

    #[test]
    fn compose_grid_is_deterministic_under_a_seed() {
        let make = || {
            (
                vec![image(1, "unclassified")],
                vec![image(2, "glass"), image(3, "metal"), image(4, "paper")],
            )
        };
        let (probes, fillers) = make();
        let first: Vec<i32> = compose_grid(probes, fillers, &mut StdRng::seed_from_u64(42))
            .iter()
            .map(|r| r.id)
            .collect();
        let (probes, fillers) = make();
        let second: Vec<i32> = compose_grid(probes, fillers, &mut StdRng::seed_from_u64(42))
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn wire_images_carry_indices_and_no_label() {
        let grid = vec![image(1, "glass"), image(2, "unclassified")];
        let wire = to_wire(&grid);
        assert_eq!(wire.len(), 2);
        for (i, info) in wire.iter().enumerate() {
            assert_eq!(info.index, i);
            let value = serde_json::to_value(info).unwrap();
            let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
            assert_eq!(keys.len(), 3);
            assert!(!keys.contains(&"label"));
            assert!(!keys.contains(&"id"));
        }
    }
}
