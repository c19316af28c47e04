use crate::errors::CartError;
use std::fmt;

/// Contiguous row major matrix view over the feature data.
///
/// The matrix does not own its data, it borrows a single slice where
/// each row is stored one after the other. Features only, the label
/// vector is passed separately.
///
/// # Type Parameters
/// * `T` - The type of the values stored, usually `f64`.
pub struct Matrix<'a, T> {
    /// The raw data stored in a single slice.
    pub data: &'a [T],
    /// Indices of the rows in the matrix.
    pub index: Vec<usize>,
    /// Number of rows in the matrix.
    pub rows: usize,
    /// Number of columns in the matrix.
    pub cols: usize,
}

impl<'a, T> Matrix<'a, T> {
    /// Create a new Matrix.
    ///
    /// * `data` - Values in row major order.
    /// * `rows` - Number of rows (samples).
    /// * `cols` - Number of columns (features).
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> Self {
        Matrix {
            data,
            index: (0..rows).collect(),
            rows,
            cols,
        }
    }

    /// Get a single reference to an item in the matrix.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i * self.cols + j]
    }

    /// Get a row of the matrix as a slice.
    pub fn get_row(&self, row: usize) -> &'a [T] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Iterate over the rows of the matrix.
    pub fn rows_iter(&self) -> std::slice::Chunks<'a, T> {
        self.data.chunks(self.cols.max(1))
    }
}

impl<'a, T> fmt::Display for Matrix<'a, T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut val = String::new();
        for i in 0..self.rows {
            for j in 0..self.cols {
                val.push_str(self.get(i, j).to_string().as_str());
                if j == (self.cols - 1) {
                    val.push('\n');
                } else {
                    val.push(' ');
                }
            }
        }
        write!(f, "{}", val)
    }
}

/// Check the feature matrix and the label vector before they reach the tree.
///
/// Fails on empty data, inconsistent shapes, and any non finite value. Missing
/// values have to be imputed before the data is handed over.
pub fn validate_inputs(data: &Matrix<f64>, y: &[f64]) -> Result<(), CartError> {
    if data.rows == 0 || data.cols == 0 {
        return Err(CartError::InvalidInput(format!(
            "dataset is empty ({} rows, {} columns)",
            data.rows, data.cols
        )));
    }
    if data.data.len() != data.rows * data.cols {
        return Err(CartError::InvalidInput(format!(
            "matrix holds {} values, but {} rows x {} columns were declared",
            data.data.len(),
            data.rows,
            data.cols
        )));
    }
    if y.len() != data.rows {
        return Err(CartError::InvalidInput(format!(
            "{} labels provided for {} rows",
            y.len(),
            data.rows
        )));
    }
    if let Some(pos) = data.data.iter().position(|v| !v.is_finite()) {
        return Err(CartError::InvalidInput(format!(
            "non finite value {} found at row {}, column {}",
            data.data[pos],
            pos / data.cols,
            pos % data.cols
        )));
    }
    if let Some(pos) = y.iter().position(|v| !v.is_finite()) {
        return Err(CartError::InvalidInput(format!(
            "non finite label {} found at row {}",
            y[pos], pos
        )));
    }
    Ok(())
}
