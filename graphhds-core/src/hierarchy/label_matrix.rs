//! Dense row-major `levels × nodes` label storage.

/// Cluster labels for every node at every retained level.
///
/// Row `0` is the coarsest level and the last row the densest. A cell value
/// of `0` means the node is unclustered at that level.
///
/// # Examples
/// ```
/// use graphhds_core::LabelMatrix;
///
/// let matrix = LabelMatrix::from_rows(vec![vec![1, 1, 1], vec![2, 2, 0]]).expect("rows align");
/// assert_eq!(matrix.rows(), 2);
/// assert_eq!(matrix.columns(), 3);
/// assert_eq!(matrix.get(1, 2), Some(0));
/// assert_eq!(matrix.column(0), vec![1, 2]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelMatrix {
    rows: usize,
    columns: usize,
    cells: Vec<u32>,
}

impl LabelMatrix {
    /// Creates an all-zero matrix.
    #[must_use]
    pub fn zeroed(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![0; rows * columns],
        }
    }

    /// Builds a matrix from explicit rows. Returns `None` when the rows have
    /// different lengths.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Option<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != columns) {
            return None;
        }
        Some(Self {
            rows: rows.len(),
            columns,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of levels.
    #[must_use]
    #[rustfmt::skip]
    pub const fn rows(&self) -> usize { self.rows }

    /// Number of nodes.
    #[must_use]
    #[rustfmt::skip]
    pub const fn columns(&self) -> usize { self.columns }

    /// Returns `true` when the matrix holds no levels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Label of `node` at `row`.
    #[must_use]
    pub fn get(&self, row: usize, node: usize) -> Option<u32> {
        if node >= self.columns {
            return None;
        }
        self.cells.get(row * self.columns + node).copied()
    }

    /// Labels of every node at `row`.
    #[must_use]
    pub fn row(&self, row: usize) -> &[u32] {
        let start = row.saturating_mul(self.columns);
        self.cells
            .get(start..start.saturating_add(self.columns))
            .unwrap_or_default()
    }

    /// Labels of `node` across all rows, coarsest first.
    #[must_use]
    pub fn column(&self, node: usize) -> Vec<u32> {
        (0..self.rows)
            .filter_map(|row| self.get(row, node))
            .collect()
    }

    /// Iterates rows from coarsest to densest.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        (0..self.rows).map(move |row| self.row(row))
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [u32] {
        let start = row.saturating_mul(self.columns);
        let end = start.saturating_add(self.columns);
        self.cells.get_mut(start..end).unwrap_or_default()
    }
}
