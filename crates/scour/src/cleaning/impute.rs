//! Nearest-neighbour imputation across numeric columns.

/// Fills gaps in a numeric matrix from the most similar complete rows.
///
/// Distance between two rows uses only the coordinates both rows have, scaled
/// up by the share of coordinates that were usable:
/// `sqrt(total / present * sum_of_squares)`. A gap is filled with the mean of
/// the `k` nearest rows that hold a value in that column. When no row shares
/// any coordinate with the row being filled, the column mean is used.
#[derive(Debug, Clone, Copy)]
pub struct KnnImputer {
    neighbors: usize,
}

impl KnnImputer {
    pub fn new(neighbors: usize) -> Self {
        Self {
            neighbors: neighbors.max(1),
        }
    }

    pub fn neighbors(&self) -> usize {
        self.neighbors
    }

    /// Fill the gaps of a column-major matrix. Returns the filled matrix and
    /// the number of values filled in each column. A column with no values
    /// at all is left as it is.
    pub fn impute(&self, columns: &[Vec<Option<f64>>]) -> (Vec<Vec<Option<f64>>>, Vec<usize>) {
        let mut filled = columns.to_vec();
        let mut counts = vec![0; columns.len()];
        let rows = columns.first().map(Vec::len).unwrap_or(0);

        for (col, values) in columns.iter().enumerate() {
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            if present.is_empty() {
                continue;
            }
            let column_mean = present.iter().sum::<f64>() / present.len() as f64;

            for row in (0..rows).filter(|&r| values[r].is_none()) {
                let mut donors: Vec<(f64, f64)> = (0..rows)
                    .filter_map(|other| {
                        let value = values[other]?;
                        let distance = self.distance(columns, row, other)?;
                        Some((distance, value))
                    })
                    .collect();
                donors.sort_by(|a, b| a.0.total_cmp(&b.0));
                donors.truncate(self.neighbors);

                let value = if donors.is_empty() {
                    column_mean
                } else {
                    donors.iter().map(|(_, v)| v).sum::<f64>() / donors.len() as f64
                };
                filled[col][row] = Some(value);
                counts[col] += 1;
            }
        }

        (filled, counts)
    }

    fn distance(&self, columns: &[Vec<Option<f64>>], a: usize, b: usize) -> Option<f64> {
        let mut present = 0;
        let mut sum = 0.0;
        for column in columns {
            if let (Some(x), Some(y)) = (column[a], column[b]) {
                present += 1;
                sum += (x - y).powi(2);
            }
        }
        (present > 0).then(|| (columns.len() as f64 / present as f64 * sum).sqrt())
    }
}
