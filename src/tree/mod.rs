//! Decision Tree
//!
//! Growing a tree from data, and using it to classify rows.
pub mod predict;
#[allow(clippy::module_inception)]
pub mod tree;

pub use tree::Tree;

// Unit-testing
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelIO, PrunePolicy};
    use crate::errors::CartError;
    use crate::splitter::SplitRule;
    use crate::Matrix;
    use hashbrown::HashSet;
    use rand::rngs::StdRng;
    use rand::Rng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    // age, embarked (S=0, C=1), survived
    fn titanic_sample() -> (Vec<f64>, Vec<f64>) {
        let data = vec![22., 0., 38., 1., 26., 0., 35., 0.];
        let y = vec![0., 1., 1., 0.];
        (data, y)
    }

    fn categorical(features: &[usize]) -> HashSet<usize> {
        features.iter().copied().collect()
    }

    fn random_data(rng: &mut StdRng, rows: usize, cols: usize) -> (Vec<f64>, Vec<f64>) {
        let data: Vec<f64> = (0..rows * cols).map(|_| rng.gen_range(0..5) as f64).collect();
        let y: Vec<f64> = (0..rows)
            .map(|i| {
                let noise = rng.gen_range(0..10) == 0;
                let label = data[i * cols] + data[i * cols + cols - 1] >= 4.0;
                (label ^ noise) as u8 as f64
            })
            .collect();
        (data, y)
    }

    #[test]
    fn test_tree_fit_titanic_sample() {
        let (data, y) = titanic_sample();
        let matrix = Matrix::new(&data, 4, 2);
        let mut tree = Tree::default().set_categorical_features(categorical(&[1]));
        tree.fit(&matrix, &y).unwrap();
        println!("{}", tree);

        let root = tree.root().unwrap();
        assert_eq!(root.impurity, 0.5);
        assert_eq!(root.n_samples, 4);
        assert!(root.split_gain > 0.0);
        // The best candidates tie at a gain of 1/6, the last one wins.
        assert_eq!(root.split_feature, Some(1));
        assert_eq!(root.split_rule, Some(SplitRule::Equals(1)));
        assert!(tree.nodes.iter().all(|n| n.is_consistent()));
        assert!(tree.leaves().all(|n| n.impurity == 0.0));
        assert_eq!(tree.n_leaves, 4);
        assert_eq!(tree.depth, 3);

        assert_eq!(tree.classify(&[50., 1.]).unwrap(), 1.);
        assert_eq!(tree.predict(&matrix, false).unwrap(), y);
        assert_eq!(tree.score(&matrix, &y).unwrap(), 100.0);
    }

    #[test]
    fn test_tree_pure_dataset_is_single_leaf() {
        let data = vec![1., 7., 2., 3., 5., 0., 9., 1.];
        let y = vec![1.; 4];
        let matrix = Matrix::new(&data, 4, 2);
        let mut tree = Tree::default();
        tree.fit(&matrix, &y).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.root().unwrap().result, Some(1.));
        assert_eq!(tree.root().unwrap().impurity, 0.0);
        assert_eq!(tree.classify(&[100., -3.]).unwrap(), 1.);
    }

    #[test]
    fn test_tree_perfect_categorical_split() {
        let data = vec![0., 1., 2., 0., 1., 2.];
        let y = vec![0., 1., 1., 0., 1., 1.];
        let matrix = Matrix::new(&data, 6, 1);
        let mut tree = Tree::default().set_categorical_features(categorical(&[0]));
        tree.fit(&matrix, &y).unwrap();
        assert!(tree
            .nodes
            .iter()
            .any(|n| !n.is_leaf() && (n.split_gain - n.impurity).abs() < 1e-12));
        assert_eq!(tree.root().unwrap().split_rule, Some(SplitRule::Equals(0)));
        assert_eq!(tree.score(&matrix, &y).unwrap(), 100.0);
        // The split is informative, pruning keeps it.
        assert_eq!(tree.nodes.len(), 3);
    }

    #[test]
    fn test_tree_exhausted_features_majority_leaf() {
        // Identical feature rows with mixed labels, no split is possible.
        let data = vec![1., 1., 1., 1., 1., 1.];
        let y = vec![1., 0., 0.];
        let matrix = Matrix::new(&data, 3, 2);
        let mut tree = Tree::default();
        tree.fit(&matrix, &y).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.root().unwrap().result, Some(0.));
        assert_eq!(tree.root().unwrap().counts.n_labels(), 2);
    }

    #[test]
    fn test_tree_no_gain_leaf_holds_majority() {
        // Every split leaves the label mix unchanged.
        let data = vec![0., 0., 1., 1.];
        let y = vec![1., 0., 1., 0.];
        let matrix = Matrix::new(&data, 4, 1);
        let mut tree = Tree::default();
        tree.fit(&matrix, &y).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        let root = tree.root().unwrap();
        assert_eq!(root.result, Some(1.));
        assert_eq!(root.counts.iter().cloned().collect::<Vec<_>>(), vec![(1., 2), (0., 2)]);
    }

    #[test]
    fn test_tree_feature_reuse() {
        let data = vec![1., 2., 3., 4.];
        let y = vec![0., 1., 1., 0.];
        let matrix = Matrix::new(&data, 4, 1);

        let mut tree = Tree::default();
        tree.fit(&matrix, &y).unwrap();
        assert_eq!(tree.depth, 2);
        assert_eq!(tree.nodes.len(), 5);
        assert_eq!(tree.root().unwrap().split_rule, Some(SplitRule::Threshold(4.)));

        let mut tree = Tree::default().set_allow_feature_reuse(false);
        tree.fit(&matrix, &y).unwrap();
        assert_eq!(tree.depth, 1);
        assert_eq!(tree.nodes.len(), 3);
        assert_eq!(tree.classify(&[2.]).unwrap(), 1.);
    }

    #[test]
    fn test_tree_leaves_partition_rows() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..20 {
            let (rows, cols) = (rng.gen_range(1..60), rng.gen_range(1..5));
            let (data, y) = random_data(&mut rng, rows, cols);
            let matrix = Matrix::new(&data, rows, cols);
            let mut tree = Tree::default();
            tree.fit(&matrix, &y).unwrap();
            assert!(tree.nodes.iter().all(|n| n.is_consistent()));
            assert!(tree.nodes.iter().enumerate().all(|(i, n)| n.num == i));

            let leaf_idx = tree.apply(&matrix).unwrap();
            assert!(leaf_idx.iter().all(|i| tree.nodes[*i].is_leaf()));
            for leaf in tree.leaves() {
                let reached = leaf_idx.iter().filter(|i| **i == leaf.num).count();
                assert_eq!(reached, leaf.n_samples);
            }
            assert_eq!(tree.leaves().map(|n| n.n_samples).sum::<usize>(), rows);
        }
    }

    #[test]
    fn test_tree_depth_without_reuse() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let (rows, cols) = (rng.gen_range(2..80), rng.gen_range(1..6));
            let (data, y) = random_data(&mut rng, rows, cols);
            let matrix = Matrix::new(&data, rows, cols);
            let mut tree = Tree::default().set_allow_feature_reuse(false);
            tree.fit(&matrix, &y).unwrap();
            assert!(tree.depth <= cols);
            for node in tree.nodes.iter().filter(|n| !n.is_leaf()) {
                assert!(node.split_gain > 0.0);
                assert!(node.split_gain <= node.impurity + 1e-12);
            }
        }
    }

    #[test]
    fn test_tree_score_idempotent() {
        let mut rng = StdRng::seed_from_u64(11);
        let (data, y) = random_data(&mut rng, 200, 3);
        let matrix = Matrix::new(&data[..300], 100, 3);
        let test = Matrix::new(&data[300..], 100, 3);
        let mut tree = Tree::default();
        tree.fit(&matrix, &y[..100]).unwrap();
        let first = tree.score(&test, &y[100..]).unwrap();
        let n_nodes = tree.nodes.len();
        let second = tree.score(&test, &y[100..]).unwrap();
        assert!(tree.pruned);
        assert_eq!(first, second);
        assert_eq!(n_nodes, tree.nodes.len());
        assert!((0.0..=100.0).contains(&first));
    }

    #[test]
    fn test_tree_score_prunes_weak_split() {
        let data = vec![0., 0., 0., 0., 1., 1., 1., 1.];
        let y = vec![0., 0., 0., 1., 1., 0., 1., 0.];
        let matrix = Matrix::new(&data, 8, 1);

        let mut tree = Tree::default();
        tree.fit(&matrix, &y).unwrap();
        assert_eq!(tree.nodes.len(), 3);
        assert_eq!(tree.classify(&[1.]).unwrap(), 1.);
        assert_eq!(tree.score(&matrix, &y).unwrap(), 62.5);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.classify(&[1.]).unwrap(), 0.);

        let mut tree = Tree::default().set_prune_policy(PrunePolicy::Disabled);
        tree.fit(&matrix, &y).unwrap();
        tree.score(&matrix, &y).unwrap();
        assert_eq!(tree.nodes.len(), 3);

        let mut tree = Tree::default().set_prune_threshold(0.01);
        tree.fit(&matrix, &y).unwrap();
        tree.score(&matrix, &y).unwrap();
        assert_eq!(tree.nodes.len(), 3);
    }

    #[test]
    fn test_tree_refit_resets_pruning() {
        let data = vec![0., 0., 0., 0., 1., 1., 1., 1.];
        let y = vec![0., 0., 0., 1., 1., 0., 1., 0.];
        let matrix = Matrix::new(&data, 8, 1);
        let mut tree = Tree::default();
        tree.fit(&matrix, &y).unwrap();
        tree.score(&matrix, &y).unwrap();
        assert!(tree.pruned);
        tree.fit(&matrix, &y).unwrap();
        assert!(!tree.pruned);
        assert_eq!(tree.nodes.len(), 3);
    }

    #[test]
    fn test_tree_parallel_predict() {
        let mut rng = StdRng::seed_from_u64(3);
        let (data, y) = random_data(&mut rng, 500, 4);
        let matrix = Matrix::new(&data, 500, 4);
        let mut tree = Tree::default();
        tree.fit(&matrix, &y).unwrap();
        assert_eq!(tree.predict(&matrix, true).unwrap(), tree.predict(&matrix, false).unwrap());
    }

    #[test]
    fn test_tree_invalid_input() {
        let (data, y) = titanic_sample();
        let matrix = Matrix::new(&data, 4, 2);
        let mut tree = Tree::default();
        assert!(matches!(tree.fit(&matrix, &y[..3]), Err(CartError::InvalidInput(_))));
        let empty: Vec<f64> = Vec::new();
        assert!(matches!(
            tree.fit(&Matrix::new(&empty, 0, 2), &[]),
            Err(CartError::InvalidInput(_))
        ));
        assert_eq!(tree.classify(&[1., 0.]), Err(CartError::NotFitted));
        assert!(matches!(tree.score(&matrix, &y), Err(CartError::NotFitted)));

        tree.fit(&matrix, &y).unwrap();
        assert_eq!(
            tree.classify(&[1.]),
            Err(CartError::RowTooShort { expected: 2, found: 1 })
        );
        assert!(matches!(tree.score(&matrix, &y[..2]), Err(CartError::InvalidInput(_))));

        let mut tree = Tree::default().set_prune_threshold(-1.);
        assert!(matches!(tree.fit(&matrix, &y), Err(CartError::InvalidParameter(..))));
    }

    #[test]
    fn test_tree_invalid_category() {
        let (mut data, y) = titanic_sample();
        let mut tree = Tree::default().set_categorical_features(categorical(&[1]));
        tree.fit(&Matrix::new(&data, 4, 2), &y).unwrap();
        assert_eq!(
            tree.classify(&[30., 0.5]),
            Err(CartError::InvalidCategory { feature: 1, value: 0.5 })
        );

        data[3] = 1.5;
        let mut tree = Tree::default().set_categorical_features(categorical(&[1]));
        assert_eq!(
            tree.fit(&Matrix::new(&data, 4, 2), &y),
            Err(CartError::InvalidCategory { feature: 1, value: 1.5 })
        );

        let mut tree = Tree::default().set_categorical_features(categorical(&[5]));
        assert!(matches!(
            tree.fit(&Matrix::new(&data, 4, 2), &y),
            Err(CartError::InvalidParameter(..))
        ));
    }

    #[test]
    fn test_tree_io() {
        let (data, y) = titanic_sample();
        let matrix = Matrix::new(&data, 4, 2);
        let mut tree = Tree::default().set_categorical_features(categorical(&[1]));
        tree.fit(&matrix, &y).unwrap();
        tree.score(&matrix, &y).unwrap();

        let json = tree.json_dump().unwrap();
        let tree2 = Tree::from_json(&json).unwrap();
        assert_eq!(tree2.nodes, tree.nodes);
        assert!(tree2.pruned);
        assert_eq!(tree2.predict(&matrix, false).unwrap(), tree.predict(&matrix, false).unwrap());

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("tree.json");
        tree.save_model(&file_path).unwrap();
        let tree3 = Tree::load_model(&file_path).unwrap();
        assert_eq!(tree3.to_string(), tree.to_string());
        assert!(matches!(
            Tree::load_model(dir.path().join("missing.json")),
            Err(CartError::UnableToRead(_))
        ));
    }

    #[test]
    fn test_tree_corrupted_model() {
        let data: Vec<f64> = (0..8).map(f64::from).collect();
        let y = vec![0., 0., 0., 0., 1., 1., 1., 1.];
        let matrix = Matrix::new(&data, 8, 1);
        let mut tree = Tree::default();
        tree.fit(&matrix, &y).unwrap();
        assert_eq!(tree.nodes[0].true_child, Some(1));

        let json = tree.json_dump().unwrap();
        let corrupted = json.replace("\"true_child\":1", "\"true_child\":9");
        assert_ne!(corrupted, json);
        assert!(matches!(Tree::from_json(&corrupted), Err(CartError::InvalidInput(_))));

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("corrupted.json");
        std::fs::write(&file_path, &corrupted).unwrap();
        assert!(matches!(Tree::load_model(&file_path), Err(CartError::InvalidInput(_))));

        // Nodes edited in place are caught before pruning as well.
        tree.nodes[0].true_child = Some(9);
        assert!(matches!(tree.score(&matrix, &y), Err(CartError::InvalidInput(_))));
        assert!(!tree.pruned);
        assert!(tree.to_string().contains("9:missing"));

        tree.nodes[0].true_child = Some(0);
        assert!(tree.validate_nodes().is_err());
        assert!(tree.to_string().contains("0:missing"));
    }

    #[test]
    fn test_tree_display() {
        let data = vec![0., 1., 2., 0., 1., 2.];
        let y = vec![0., 1., 1., 0., 1., 1.];
        let matrix = Matrix::new(&data, 6, 1);
        let mut tree = Tree::default().set_categorical_features(categorical(&[0]));
        tree.fit(&matrix, &y).unwrap();
        let lines: Vec<String> = tree.to_string().lines().map(String::from).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("0:[f0 == 0] yes=1,no=2"));
        assert_eq!(lines[1], "      1:leaf=0,impurity=0.000,samples=2");
        assert_eq!(lines[2], "      2:leaf=1,impurity=0.000,samples=4");
    }
}
