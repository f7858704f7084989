//! Structural validation of system definitions.
//!
//! Checks ids, references and parameter ranges. Port counts and transfer
//! function properties are checked when the system is built.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use sf_lti::Method;
use thiserror::Error;

use crate::schema::{BlockDef, BlockKindDef, EdgeDef, INPUT_NODE, OUTPUT_NODE, SystemDef};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_system(def: &SystemDef) -> Result<(), ValidationError> {
    if def.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: def.version,
        });
    }

    if let Some(rate) = def.sample_rate_hz {
        ensure_positive(rate, "sample_rate_hz".to_string())?;
    }
    if let Some(budget) = def.options.tick_budget_s {
        ensure_positive(budget, "options.tick_budget_s".to_string())?;
        tick_budget(budget)?;
    }

    validate_graph(&def.name, &def.blocks, &def.edges)
}

fn validate_graph(context: &str, blocks: &[BlockDef], edges: &[EdgeDef]) -> Result<(), ValidationError> {
    let mut ids = HashSet::new();
    for block in blocks {
        if block.id == INPUT_NODE || block.id == OUTPUT_NODE {
            return Err(ValidationError::InvalidValue {
                field: format!("'{context}' block id"),
                value: block.id.clone(),
                reason: "reserved for the system boundary".to_string(),
            });
        }
        if !ids.insert(block.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: block.id.clone(),
                context: format!("'{context}' blocks"),
            });
        }
        validate_block(block)?;
    }

    for edge in edges {
        for end in [&edge.from, &edge.to] {
            if end != INPUT_NODE && end != OUTPUT_NODE && !ids.contains(end.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: end.clone(),
                    context: format!("'{context}' edges"),
                });
            }
        }
    }

    Ok(())
}

fn validate_block(block: &BlockDef) -> Result<(), ValidationError> {
    let field = |name: &str| format!("block '{}' {}", block.id, name);

    match &block.kind {
        BlockKindDef::Identity => Ok(()),
        BlockKindDef::Matrix { rows } => {
            let cols = rows.first().map(Vec::len).unwrap_or(0);
            if cols == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field("rows"),
                    value: format!("{rows:?}"),
                    reason: "matrix must have at least one row and one column".to_string(),
                });
            }
            if rows.iter().any(|r| r.len() != cols) {
                return Err(ValidationError::InvalidValue {
                    field: field("rows"),
                    value: format!("{rows:?}"),
                    reason: "rows must all have the same length".to_string(),
                });
            }
            ensure_all_finite(rows.iter().flatten().copied(), field("rows"))
        }
        BlockKindDef::Junction { signs } => {
            if signs.is_empty() || signs.chars().any(|c| c != '+' && c != '-') {
                return Err(ValidationError::InvalidValue {
                    field: field("signs"),
                    value: signs.clone(),
                    reason: "must be a non-empty string of '+' and '-'".to_string(),
                });
            }
            Ok(())
        }
        BlockKindDef::Filter {
            num,
            den,
            sample_rate_hz,
            method,
        } => {
            validate_tf(num, den, &field)?;
            ensure_positive(*sample_rate_hz, field("sample_rate_hz"))?;
            Method::from_str(method).map_err(|e| ValidationError::InvalidValue {
                field: field("method"),
                value: method.clone(),
                reason: e.to_string(),
            })?;
            Ok(())
        }
        BlockKindDef::Lti { num, den, dt_s } => {
            validate_tf(num, den, &field)?;
            ensure_positive(*dt_s, field("dt_s"))
        }
        BlockKindDef::Subsystem { blocks, edges, .. } => validate_graph(&block.id, blocks, edges),
    }
}

fn validate_tf(num: &[f64], den: &[f64], field: &dyn Fn(&str) -> String) -> Result<(), ValidationError> {
    if num.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: field("num"),
            value: "[]".to_string(),
            reason: "numerator must not be empty".to_string(),
        });
    }
    if den.iter().all(|c| *c == 0.0) {
        return Err(ValidationError::InvalidValue {
            field: field("den"),
            value: format!("{den:?}"),
            reason: "denominator must have a non-zero coefficient".to_string(),
        });
    }
    ensure_all_finite(num.iter().copied(), field("num"))?;
    ensure_all_finite(den.iter().copied(), field("den"))
}

fn ensure_positive(v: f64, field: String) -> Result<(), ValidationError> {
    if !v.is_finite() || v <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field,
            value: v.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }
    Ok(())
}

/// A tick budget in seconds as a `Duration`.
pub(crate) fn tick_budget(seconds: f64) -> Result<Duration, ValidationError> {
    Duration::try_from_secs_f64(seconds).map_err(|e| ValidationError::InvalidValue {
        field: "options.tick_budget_s".to_string(),
        value: seconds.to_string(),
        reason: e.to_string(),
    })
}

fn ensure_all_finite(values: impl IntoIterator<Item = f64>, field: String) -> Result<(), ValidationError> {
    if let Some(bad) = values.into_iter().find(|v| !v.is_finite()) {
        return Err(ValidationError::InvalidValue {
            field,
            value: bad.to_string(),
            reason: "must be finite".to_string(),
        });
    }
    Ok(())
}
