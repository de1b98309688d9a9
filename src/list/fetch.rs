//! Sequencing of list requests.
//!
//! Every fetch is tagged with a generation number. Responses are applied only
//! if they carry the latest generation, so a slow response for an old query
//! can never overwrite the rows of a newer one.

/// Hands out generation numbers and remembers the latest one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchGeneration {
    latest: u64,
}

impl FetchGeneration {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_latest(&self, generation: u64) -> bool {
        self.latest == generation
    }
}

/// A list request that has been issued but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub(super) generation: u64,
    pub(super) path: String,
    pub(super) params: Vec<(&'static str, String)>,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The API path to request.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The query parameters to send with the request.
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }
}

/// What the caller must do to bring a list up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
    /// Send the request and hand the response back with the ticket.
    Request(FetchTicket),
    /// The filter matches nothing; the result was emptied without a request.
    ShortCircuit,
}

/// How a response was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The rows were replaced.
    Applied,
    /// The rows were replaced and the page was clamped, so another fetch is needed.
    Clamped,
    /// The request failed; the previous rows are kept.
    Failed,
    /// A newer request was issued in the meantime; the response was dropped.
    Stale,
}

#[cfg(test)]
mod tests {
    use super::FetchGeneration;

    #[test]
    fn only_latest_generation_is_current() {
        let mut generation = FetchGeneration::default();

        let first = generation.issue();
        let second = generation.issue();

        assert!(second > first);
        assert!(!generation.is_latest(first));
        assert!(generation.is_latest(second));
    }
}
