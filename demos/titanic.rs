//! An example using the `titanic` dataset
//!
//! Usage: `cargo run --example titanic -- path/to/titanic.csv`
use cartree::{Matrix, Tree};
use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let path = match args.get(1) {
        Some(path) => path.as_str(),
        None => {
            eprintln!("Usage: cargo run --example titanic -- path/to/titanic.csv");
            std::process::exit(2);
        }
    };

    // Identifier like columns (PassengerId, Name, Ticket, Cabin) are left out.
    let feature_names = ["Pclass", "Sex", "Age", "SibSp", "Parch", "Fare", "Embarked"];
    let categorical_names = ["Sex", "Embarked"];
    let target_name = "Survived";

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| format!("column {} not found", name))
    };
    let feature_indices = feature_names.iter().map(|&n| position(n)).collect::<Result<Vec<_>, _>>()?;
    let target_index = position(target_name)?;

    // Category codes are handed out in the order values are first seen.
    let mut codes: Vec<HashMap<String, usize>> = vec![HashMap::new(); feature_names.len()];
    let mut last_row: Vec<f64> = vec![0.0; feature_names.len()];
    let mut data = Vec::new();
    let mut y = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        y.push(record[target_index].parse::<f64>()?);

        for (i, &idx) in feature_indices.iter().enumerate() {
            let val_str = &record[idx];
            // Missing values are filled forward from the previous row.
            if !val_str.is_empty() {
                last_row[i] = if categorical_names.contains(&feature_names[i]) {
                    let n_codes = codes[i].len();
                    *codes[i].entry(val_str.to_string()).or_insert(n_codes) as f64
                } else {
                    val_str.parse::<f64>()?
                };
            }
        }
        data.extend_from_slice(&last_row);
    }

    let n_cols = feature_names.len();
    let n_train = y.len() / 10 * 7;
    let train = Matrix::new(&data[..n_train * n_cols], n_train, n_cols);
    let test = Matrix::new(&data[n_train * n_cols..], y.len() - n_train, n_cols);

    let categorical = feature_names
        .iter()
        .enumerate()
        .filter(|(_, n)| categorical_names.contains(*n))
        .map(|(i, _)| i)
        .collect();
    let mut tree = Tree::default().set_categorical_features(categorical);
    tree.fit(&train, &y[..n_train])?;
    println!("Fitted tree with {} nodes, depth {}", tree.nodes.len(), tree.depth);

    let accuracy = tree.score(&test, &y[n_train..])?;
    println!("ACC:  {:.4}%", accuracy);
    println!("Pruned tree:\n{}", tree);

    Ok(())
}
