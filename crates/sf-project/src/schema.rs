//! System definition file schema.

use serde::{Deserialize, Serialize};

/// Reserved id of the system input boundary in edge definitions.
pub const INPUT_NODE: &str = "input";
/// Reserved id of the system output boundary in edge definitions.
pub const OUTPUT_NODE: &str = "output";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemDef {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub inputs: usize,
    #[serde(default)]
    pub outputs: usize,
    /// Rate at which a driver ticks the system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate_hz: Option<f64>,
    #[serde(default)]
    pub options: OptionsDef,
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
    #[serde(default)]
    pub edges: Vec<EdgeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OptionsDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_budget_s: Option<f64>,
    #[serde(default)]
    pub output_hold: OutputHoldDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputHoldDef {
    #[default]
    Latched,
    Fresh,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub kind: BlockKindDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum BlockKindDef {
    Identity,
    Matrix {
        rows: Vec<Vec<f64>>,
    },
    Junction {
        #[serde(default = "default_signs")]
        signs: String,
    },
    Filter {
        num: Vec<f64>,
        den: Vec<f64>,
        sample_rate_hz: f64,
        #[serde(default = "default_method")]
        method: String,
    },
    Lti {
        num: Vec<f64>,
        den: Vec<f64>,
        dt_s: f64,
    },
    Subsystem {
        #[serde(default)]
        inputs: usize,
        #[serde(default)]
        outputs: usize,
        #[serde(default)]
        blocks: Vec<BlockDef>,
        #[serde(default)]
        edges: Vec<EdgeDef>,
    },
}

impl BlockKindDef {
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockKindDef::Identity => "Identity",
            BlockKindDef::Matrix { .. } => "Matrix",
            BlockKindDef::Junction { .. } => "Junction",
            BlockKindDef::Filter { .. } => "Filter",
            BlockKindDef::Lti { .. } => "Lti",
            BlockKindDef::Subsystem { .. } => "Subsystem",
        }
    }
}

fn default_signs() -> String {
    "++".to_string()
}

fn default_method() -> String {
    "bilinear".to_string()
}

/// One wire. `from`/`to` are block ids or the reserved `input`/`output`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeDef {
    pub from: String,
    #[serde(default)]
    pub from_port: usize,
    pub to: String,
    #[serde(default)]
    pub to_port: usize,
}
