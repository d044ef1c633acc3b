//! Normalisation of `next` payloads into [`StreamEvent`]s.
//!
//! The source delivers `data.Solana.Instructions` either as one object or
//! as an array of objects. Both shapes are folded into one ordered
//! `Vec<StreamEvent>` here, before anything reaches the processor.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::StreamEvent;

#[derive(Debug, Deserialize)]
struct ExecutionResult {
    #[serde(default)]
    data: Option<DataRoot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DataRoot {
    #[serde(default)]
    solana: Option<SolanaRoot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SolanaRoot {
    #[serde(default)]
    instructions: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RawInstruction {
    block: Option<RawBlock>,
    instruction: Option<RawInstructionBody>,
    transaction: Option<RawTransaction>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RawBlock {
    time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RawInstructionBody {
    method: Option<String>,
    accounts: Option<Vec<Option<RawAccount>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RawAccount {
    address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RawTransaction {
    signature: Option<String>,
}

impl From<RawInstruction> for StreamEvent {
    fn from(raw: RawInstruction) -> Self {
        let (method, accounts) = match raw.instruction {
            Some(body) => (body.method, body.accounts.unwrap_or_default()),
            None => (None, Vec::new()),
        };
        let accounts = accounts
            .into_iter()
            .flatten()
            .filter_map(|account| account.address)
            .filter(|address| !address.is_empty())
            .collect();

        Self {
            accounts,
            signature: raw
                .transaction
                .and_then(|tx| tx.signature)
                .unwrap_or_default(),
            block_time: raw
                .block
                .and_then(|block| block.time)
                .and_then(|time| DateTime::parse_from_rfc3339(&time).ok())
                .map(|time| time.with_timezone(&Utc)),
            method,
        }
    }
}

/// Decodes one instruction object. Anything other than a JSON object is
/// rejected, so a struct is never filled from a positional sequence.
fn decode_instruction(value: &Value) -> Result<RawInstruction, String> {
    if !value.is_object() {
        return Err(format!("expected an object, got {value}"));
    }
    RawInstruction::deserialize(value).map_err(|e| e.to_string())
}

/// Extracts the events carried by one `next` payload.
///
/// Returns `None` when the payload lacks `data.Solana.Instructions` or it
/// has an unexpected shape; such messages are skipped by the caller.
/// Batch elements are decoded one by one: an undecodable element is logged
/// and skipped, and its siblings keep their order.
#[must_use]
pub fn extract_events(payload: &Value) -> Option<Vec<StreamEvent>> {
    let result = ExecutionResult::deserialize(payload).ok()?;
    let instructions = result.data?.solana?.instructions?;
    match &instructions {
        Value::Array(batch) => Some(
            batch
                .iter()
                .enumerate()
                .filter_map(|(index, element)| match decode_instruction(element) {
                    Ok(raw) => Some(StreamEvent::from(raw)),
                    Err(error) => {
                        tracing::warn!(index, %error, "skipping undecodable batch element");
                        None
                    }
                })
                .collect(),
        ),
        Value::Object(_) => match decode_instruction(&instructions) {
            Ok(raw) => Some(vec![StreamEvent::from(raw)]),
            Err(error) => {
                tracing::warn!(%error, "skipping undecodable instruction");
                None
            }
        },
        _ => None,
    }
}
