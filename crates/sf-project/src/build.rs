//! Turn a system definition into a runnable [`System`].

use std::collections::BTreeMap;

use sf_flow::{
    Block, BlockId, FlowError, Filter, Junction, Lti, MatrixBlock, Node, OutputHold, SampleConfig,
    System, SystemOptions,
};
use sf_lti::{Method, TransferFunction};

use crate::ProjectResult;
use crate::schema::{BlockDef, BlockKindDef, EdgeDef, INPUT_NODE, OUTPUT_NODE, OutputHoldDef, SystemDef};
use crate::validate::tick_budget;

/// A built system and the ids its blocks were given.
#[derive(Debug, Clone)]
pub struct BuiltSystem {
    pub system: System,
    /// Definition id -> block id.
    pub ids: BTreeMap<String, BlockId>,
}

impl BuiltSystem {
    pub fn block_id(&self, id: &str) -> Option<BlockId> {
        self.ids.get(id).copied()
    }
}

/// Build a system from a validated definition.
///
/// Blocks get ids in definition order.
pub fn build_system(def: &SystemDef) -> ProjectResult<BuiltSystem> {
    let (mut system, ids) = build_graph(def.inputs, def.outputs, &def.blocks, &def.edges)?;
    let budget = def.options.tick_budget_s.map(tick_budget).transpose()?;
    system.set_options(SystemOptions {
        tick_budget: budget,
        output_hold: match def.options.output_hold {
            OutputHoldDef::Latched => OutputHold::Latched,
            OutputHoldDef::Fresh => OutputHold::Fresh,
        },
    });
    Ok(BuiltSystem { system, ids })
}

fn build_graph(
    inputs: usize,
    outputs: usize,
    blocks: &[BlockDef],
    edges: &[EdgeDef],
) -> ProjectResult<(System, BTreeMap<String, BlockId>)> {
    let mut system = System::new(inputs, outputs);
    let mut ids = BTreeMap::new();

    for def in blocks {
        let mut block = build_block(&def.kind)?;
        if let Some(label) = &def.label {
            block = block.with_label(label.clone());
        }
        ids.insert(def.id.clone(), system.add_block(block));
    }

    for edge in edges {
        let from = resolve(&ids, &edge.from)?;
        let to = resolve(&ids, &edge.to)?;
        system.add_edge(from, edge.from_port, to, edge.to_port)?;
    }

    Ok((system, ids))
}

fn build_block(kind: &BlockKindDef) -> ProjectResult<Block> {
    let block = match kind {
        BlockKindDef::Identity => Block::identity(),
        BlockKindDef::Matrix { rows } => MatrixBlock::from_rows(rows)?.into(),
        BlockKindDef::Junction { signs } => Junction::new(signs)?.into(),
        BlockKindDef::Filter {
            num,
            den,
            sample_rate_hz,
            method,
        } => {
            let method: Method = method.parse().map_err(FlowError::from)?;
            let sample = SampleConfig::from_frequency(*sample_rate_hz)?;
            Filter::with_method(transfer_function(num, den)?, sample, method)?.into()
        }
        BlockKindDef::Lti { num, den, dt_s } => Lti::new(transfer_function(num, den)?, *dt_s)?.into(),
        BlockKindDef::Subsystem {
            inputs,
            outputs,
            blocks,
            edges,
        } => {
            let (inner, _) = build_graph(*inputs, *outputs, blocks, edges)?;
            inner.into()
        }
    };
    Ok(block)
}

fn transfer_function(num: &[f64], den: &[f64]) -> Result<TransferFunction, FlowError> {
    Ok(TransferFunction::new(num, den)?)
}

fn resolve(ids: &BTreeMap<String, BlockId>, name: &str) -> Result<Node, FlowError> {
    match name {
        INPUT_NODE => Ok(Node::Input),
        OUTPUT_NODE => Ok(Node::Output),
        other => ids
            .get(other)
            .copied()
            .map(Node::Block)
            .ok_or_else(|| FlowError::NotFound {
                what: format!("block '{other}'"),
            }),
    }
}
