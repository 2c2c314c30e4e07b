//! Request-generation tokens.
//!
//! Every lookup that may resolve late (subject details, the detail drawer) is issued a
//! [`FetchTicket`]. Only the ticket of the latest request is current; results carrying an
//! older ticket are dropped by the receiver.

/// Counter of issued requests.
#[derive(Debug, Default, Clone)]
pub struct RequestGeneration {
    latest: u64,
}

/// Token handed out with a request and presented back with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request; every earlier ticket becomes stale.
    pub fn issue(&mut self) -> FetchTicket {
        self.latest += 1;
        FetchTicket(self.latest)
    }

    /// Makes every outstanding ticket stale without starting a request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_latest_ticket_is_current() {
        let mut generation = RequestGeneration::new();
        let first = generation.issue();
        let second = generation.issue();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));

        generation.invalidate();
        assert!(!generation.is_current(second));
    }
}
