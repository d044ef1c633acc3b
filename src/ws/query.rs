//! The fixed subscription document sent upstream.

/// Program whose instructions are watched.
pub const PROGRAM_ADDRESS: &str = "dbcij3LWUppWqq96dh6gJWwBifmcGfLSB5D4DuSMaqN";

/// Instruction method that creates a new virtual pool.
pub const METHOD: &str = "initialize_virtual_pool_with_spl_token";

/// Builds the subscription selecting successful `method` calls on `program`.
#[must_use]
pub fn instructions_subscription(program: &str, method: &str) -> String {
    format!(
        r#"subscription {{
  Solana {{
    Instructions(
      where: {{
        Instruction: {{
          Program: {{ Address: {{ is: "{program}" }} }},
          Method: {{ is: "{method}" }}
        }},
        Transaction: {{ Result: {{ Success: true }} }}
      }}
    ) {{
      Block {{ Time }}
      Instruction {{ Method Accounts {{ Address }} }}
      Transaction {{ Signature }}
    }}
  }}
}}"#
    )
}

/// The subscription used in production.
#[must_use]
pub fn default_subscription() -> String {
    instructions_subscription(PROGRAM_ADDRESS, METHOD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_filters_program_method_and_success() {
        let query = default_subscription();
        assert!(query.starts_with("subscription {"));
        assert!(query.contains(r#"Address: { is: "dbcij3LWUppWqq96dh6gJWwBifmcGfLSB5D4DuSMaqN" }"#));
        assert!(query.contains(r#"Method: { is: "initialize_virtual_pool_with_spl_token" }"#));
        assert!(query.contains("Result: { Success: true }"));
        assert!(query.contains("Accounts { Address }"));
        assert!(query.contains("Transaction { Signature }"));
    }

    #[test]
    fn braces_are_balanced() {
        let query = default_subscription();
        assert_eq!(query.matches('{').count(), query.matches('}').count());
    }
}
