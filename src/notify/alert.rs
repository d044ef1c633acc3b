//! Alert payload and its Telegram HTML rendering.

use crate::domain::{MatchOutcome, StreamEvent};

/// A matched event waiting to be announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// First matched address.
    pub mint: Option<String>,
    /// First account of the instruction.
    pub pool: Option<String>,
    /// Transaction signature.
    pub signature: String,
    /// Every matched address, in source order.
    pub matched: Vec<String>,
}

impl Alert {
    /// Builds an alert from a matched event. Returns `None` when nothing
    /// matched.
    #[must_use]
    pub fn from_match(event: &StreamEvent, outcome: &MatchOutcome) -> Option<Self> {
        outcome.is_match().then(|| Self {
            mint: outcome.mint.clone(),
            pool: outcome.pool.clone(),
            signature: event.signature.clone(),
            matched: outcome.matched.clone(),
        })
    }

    /// Renders the message body for Telegram's `HTML` parse mode.
    ///
    /// Every data field is escaped, so addresses and signatures cannot
    /// inject markup.
    #[must_use]
    pub fn render_html(&self) -> String {
        format!(
            "🔥 <b>Новый DBC токен</b>\n\n\
             Mint: <code>{}</code>\n\
             Pool: <code>{}</code>\n\
             Tx: <code>{}</code>\n\
             MatchedSuffixes: <code>{}</code>",
            escape_html(self.mint.as_deref().unwrap_or("null")),
            escape_html(self.pool.as_deref().unwrap_or("null")),
            escape_html(&self.signature),
            escape_html(&self.matched.join(",")),
        )
    }
}

/// Escapes the characters Telegram's HTML parser treats as markup.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::SuffixMatcher;

    fn alert_for(accounts: &[&str], signature: &str) -> Option<Alert> {
        let event = StreamEvent::new(accounts.iter().copied(), signature);
        let outcome = MatchOutcome::evaluate(&SuffixMatcher::with_defaults(), &event.accounts);
        Alert::from_match(&event, &outcome)
    }

    #[test]
    fn no_alert_without_match() {
        assert!(alert_for(&["Bpoolabc", "Cnomatch"], "sig").is_none());
    }

    #[test]
    fn rendered_message_carries_all_fields() {
        let Some(alert) = alert_for(&["Ppool", "Mintdraft", "Otherdraftsol"], "5xSig") else {
            panic!("expected alert");
        };
        let text = alert.render_html();
        assert!(text.starts_with("🔥 <b>Новый DBC токен</b>"));
        assert!(text.contains("Mint: <code>Mintdraft</code>"));
        assert!(text.contains("Pool: <code>Ppool</code>"));
        assert!(text.contains("Tx: <code>5xSig</code>"));
        assert!(text.contains("MatchedSuffixes: <code>Mintdraft,Otherdraftsol</code>"));
    }

    #[test]
    fn data_fields_cannot_break_markup() {
        let alert = Alert {
            mint: Some("</code><b>x</b>draft".to_string()),
            pool: Some("a&b".to_string()),
            signature: "<script>".to_string(),
            matched: vec!["\"q\"".to_string()],
        };
        let text = alert.render_html();
        assert!(text.contains("&lt;/code&gt;&lt;b&gt;x&lt;/b&gt;draft"));
        assert!(text.contains("a&amp;b"));
        assert!(text.contains("&lt;script&gt;"));
        assert!(text.contains("&quot;q&quot;"));
        assert_eq!(text.matches("<code>").count(), 4);
        assert_eq!(text.matches("</code>").count(), 4);
    }

    #[test]
    fn escape_leaves_plain_addresses_untouched() {
        let addr = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
        assert_eq!(escape_html(addr), addr);
    }
}
