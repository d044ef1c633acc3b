//! Match evaluation and the record derived from it.
//!
//! [`MatchOutcome`] is computed once per [`StreamEvent`]; [`NewEventRecord`]
//! turns the outcome into the row appended to the audit log.

use super::{StreamEvent, SuffixMatcher};

/// `found_by` value stored when no address matched.
pub const NO_MATCH: &str = "no-match";

/// Result of running the suffix matcher over an event's accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Matching addresses in source order. Repeated addresses repeat here.
    pub matched: Vec<String>,
    /// First matching address.
    pub mint: Option<String>,
    /// First address overall, matched or not.
    pub pool: Option<String>,
}

impl MatchOutcome {
    /// Tests every account against `matcher`, preserving order.
    #[must_use]
    pub fn evaluate(matcher: &SuffixMatcher, accounts: &[String]) -> Self {
        let matched: Vec<String> = accounts
            .iter()
            .filter(|addr| matcher.matches(addr))
            .cloned()
            .collect();
        Self {
            mint: matched.first().cloned(),
            pool: accounts.first().cloned(),
            matched,
        }
    }

    /// Returns `true` if at least one address matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        !self.matched.is_empty()
    }

    /// Comma-joined matches, or [`NO_MATCH`].
    #[must_use]
    pub fn found_by(&self) -> String {
        if self.is_match() {
            self.matched.join(",")
        } else {
            NO_MATCH.to_string()
        }
    }
}

/// Row to append to the event store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEventRecord {
    /// Mint address.
    pub mint: Option<String>,
    /// Pool address.
    pub pool: Option<String>,
    /// Transaction signature, possibly empty.
    pub signature: String,
    /// Comma-joined matched addresses or [`NO_MATCH`].
    pub found_by: String,
    /// Reserved; always empty.
    pub matched_team: String,
}

impl NewEventRecord {
    /// Builds the record for `event` given its match outcome.
    ///
    /// On a match, mint is the first matched address and pool the first
    /// account. Without one, mint and pool are simply the first and second
    /// accounts.
    #[must_use]
    pub fn from_outcome(event: &StreamEvent, outcome: &MatchOutcome) -> Self {
        let (mint, pool) = if outcome.is_match() {
            (outcome.mint.clone(), outcome.pool.clone())
        } else {
            (event.accounts.first().cloned(), event.accounts.get(1).cloned())
        };
        Self {
            mint,
            pool,
            signature: event.signature.clone(),
            found_by: outcome.found_by(),
            matched_team: String::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn record_for(accounts: &[&str]) -> (MatchOutcome, NewEventRecord) {
        let event = StreamEvent::new(accounts.iter().copied(), "sig1");
        let outcome = MatchOutcome::evaluate(&SuffixMatcher::with_defaults(), &event.accounts);
        let record = NewEventRecord::from_outcome(&event, &outcome);
        (outcome, record)
    }

    #[test]
    fn match_uses_first_match_as_mint_and_first_account_as_pool() {
        let (outcome, record) = record_for(&["Axyz...draft", "Bpoolabc"]);
        assert!(outcome.is_match());
        assert_eq!(record.mint.as_deref(), Some("Axyz...draft"));
        assert_eq!(record.pool.as_deref(), Some("Axyz...draft"));
        assert_eq!(record.found_by, "Axyz...draft");
        assert_eq!(record.signature, "sig1");
        assert_eq!(record.matched_team, "");
    }

    #[test]
    fn pool_is_positional_even_when_unmatched() {
        let (_, record) = record_for(&["Bpoolabc", "Cmintdraftfun", "Dxdraft"]);
        assert_eq!(record.mint.as_deref(), Some("Cmintdraftfun"));
        assert_eq!(record.pool.as_deref(), Some("Bpoolabc"));
        assert_eq!(record.found_by, "Cmintdraftfun,Dxdraft");
    }

    #[test]
    fn repeated_matches_are_kept() {
        let (outcome, record) = record_for(&["Xdraft", "Y", "Xdraft"]);
        assert_eq!(outcome.matched.len(), 2);
        assert_eq!(record.found_by, "Xdraft,Xdraft");
    }

    #[test]
    fn no_match_uses_first_two_accounts() {
        let (outcome, record) = record_for(&["Bpoolabc", "Cnomatch"]);
        assert!(!outcome.is_match());
        assert_eq!(record.mint.as_deref(), Some("Bpoolabc"));
        assert_eq!(record.pool.as_deref(), Some("Cnomatch"));
        assert_eq!(record.found_by, NO_MATCH);
    }

    #[test]
    fn single_account_without_match_has_no_pool() {
        let (_, record) = record_for(&["Bonly"]);
        assert_eq!(record.mint.as_deref(), Some("Bonly"));
        assert_eq!(record.pool, None);
    }

    #[test]
    fn empty_accounts_produce_null_mint_and_pool() {
        let (outcome, record) = record_for(&[]);
        assert!(!outcome.is_match());
        assert_eq!(record.mint, None);
        assert_eq!(record.pool, None);
        assert_eq!(record.found_by, NO_MATCH);
    }
}
