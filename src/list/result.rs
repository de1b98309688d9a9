/// One page of rows plus the number of rows on all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

impl<T> ResultSet<T> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
        }
    }
}

impl<T> Default for ResultSet<T> {
    fn default() -> Self {
        Self::empty()
    }
}
