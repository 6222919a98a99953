//! Data
//!
//! Dense feature matrices and label helpers shared by the estimators.
use crate::errors::QuantificationError;

/// Contiguous Column Major Matrix data container.
///
/// This structure borrows a dense matrix of values held in a single contiguous memory block.
/// It follows column-major order (Fortran-style), which matches `nalgebra`'s storage and
/// allows for efficient column slicing.
///
/// # Type Parameters
/// * `T` - The numeric type of the data (e.g., `f64`).
#[derive(Debug, Clone, Copy)]
pub struct Matrix<'a, T> {
    /// The raw data stored in a single slice.
    pub data: &'a [T],
    /// Number of rows in the matrix.
    pub rows: usize,
    /// Number of columns in the matrix.
    pub cols: usize,
}

impl<'a, T> Matrix<'a, T> {
    /// Create a new Matrix.
    ///
    /// * `data` - Column major values, `rows * cols` long.
    /// * `rows` - Number of rows (samples).
    /// * `cols` - Number of columns (features).
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> Self {
        Matrix { data, rows, cols }
    }

    /// Get a single reference to an item in the matrix.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[j * self.rows + i]
    }

    /// Get an entire column in the matrix.
    ///
    /// * `col` - The index of the column to get.
    pub fn get_col(&self, col: usize) -> &[T] {
        &self.data[col * self.rows..(col + 1) * self.rows]
    }

    /// Get access to a row of the data, as an iterator.
    pub fn get_row_iter(&self, row: usize) -> std::iter::StepBy<std::iter::Skip<std::slice::Iter<'a, T>>> {
        self.data.iter().skip(row).step_by(self.rows.max(1))
    }

    /// Check that the buffer length agrees with the declared shape.
    pub fn validate(&self) -> Result<(), QuantificationError> {
        if self.data.len() != self.rows * self.cols {
            return Err(QuantificationError::DataShape(format!(
                "matrix declared as {}x{} but holds {} values",
                self.rows,
                self.cols,
                self.data.len()
            )));
        }
        Ok(())
    }
}

impl<'a, T> Matrix<'a, T>
where
    T: Copy,
{
    /// Get a row of the data as a vector.
    pub fn get_row(&self, row: usize) -> Vec<T> {
        self.get_row_iter(row).copied().collect()
    }

    /// Copy the selected rows into a new column major buffer.
    ///
    /// Wrap the result with `Matrix::new(&buf, rows.len(), self.cols)`.
    pub fn select_rows(&self, rows: &[usize]) -> Vec<T> {
        let mut out = Vec::with_capacity(rows.len() * self.cols);
        for j in 0..self.cols {
            let col = self.get_col(j);
            out.extend(rows.iter().map(|&i| col[i]));
        }
        out
    }
}

/// Sorted unique labels.
pub fn unique_labels(y: &[usize]) -> Vec<usize> {
    let mut classes = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes
}

/// Binarize labels against a positive class: `1.0` where `y == pos_class`, `0.0` otherwise.
pub fn binarize(y: &[usize], pos_class: usize) -> Vec<f64> {
    y.iter().map(|&v| if v == pos_class { 1.0 } else { 0.0 }).collect()
}

/// Check that features and labels describe the same, non-empty sample.
pub fn check_x_y<T>(data: &Matrix<T>, y_len: usize) -> Result<(), QuantificationError> {
    data.validate()?;
    if data.rows != y_len {
        return Err(QuantificationError::DataShape(format!(
            "found {} samples but {} labels",
            data.rows, y_len
        )));
    }
    if y_len == 0 {
        return Err(QuantificationError::DataShape("training data is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_access() {
        // [[1, 4], [2, 5], [3, 6]]
        let v = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let m = Matrix::new(&v, 3, 2);
        assert_eq!(*m.get(0, 1), 4.0);
        assert_eq!(m.get_col(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.get_row(2), vec![3.0, 6.0]);
    }

    #[test]
    fn test_select_rows() {
        let v = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let m = Matrix::new(&v, 3, 2);
        let buf = m.select_rows(&[2, 0]);
        let sub = Matrix::new(&buf, 2, 2);
        assert_eq!(sub.get_row(0), vec![3.0, 6.0]);
        assert_eq!(sub.get_row(1), vec![1.0, 4.0]);
    }

    #[test]
    fn test_check_x_y() {
        let v = vec![1.0, 2.0, 3.0];
        let m = Matrix::new(&v, 3, 1);
        assert!(check_x_y(&m, 3).is_ok());
        assert!(matches!(check_x_y(&m, 2), Err(QuantificationError::DataShape(_))));
        let bad = Matrix::new(&v, 2, 2);
        assert!(check_x_y(&bad, 2).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(unique_labels(&[3, 1, 3, 2, 1]), vec![1, 2, 3]);
        assert_eq!(binarize(&[3, 1, 3], 3), vec![1.0, 0.0, 1.0]);
    }
}
