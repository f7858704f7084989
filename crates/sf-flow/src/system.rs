//! System graph: blocks in a dense arena wired port-to-port.
//!
//! The system owns one pending-input buffer per block (one slot per input
//! port). Edges write into these buffers; a block consumes its buffer when
//! the scheduler visits it. Buffers persist across ticks, which is what
//! gives a feedback edge its one-tick delay.
//!
//! Two pseudo-nodes stand for the system boundary: [`Node::Input`] is a
//! source with one output port per declared system input, and
//! [`Node::Output`] is a sink with one input port per declared system output.
//! Each exists only while its port count is non-zero.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sf_core::BlockId;
use sf_core::timing::TickStats;
use tracing::debug;

use crate::block::{Block, SignalProcessor};
use crate::error::{FlowError, FlowResult};
use crate::signal::{Signal, zeros};

/// Endpoint of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    /// System input boundary (source only).
    Input,
    /// System output boundary (sink only).
    Output,
    /// A block in the arena.
    Block(BlockId),
}

impl From<BlockId> for Node {
    fn from(id: BlockId) -> Self {
        Node::Block(id)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Input => write!(f, "input"),
            Node::Output => write!(f, "output"),
            Node::Block(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for Node {
    type Err = FlowError;

    /// Parse `"input"`, `"output"` or a block index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "input" => Ok(Node::Input),
            "output" => Ok(Node::Output),
            other => other
                .parse::<u32>()
                .map(|i| Node::Block(BlockId::from_index(i)))
                .map_err(|_| FlowError::NotFound {
                    what: format!("node '{other}'"),
                }),
        }
    }
}

/// One wire from an output port to an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: Node,
    pub from_port: usize,
    pub to: Node,
    pub to_port: usize,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.from, self.from_port, self.to, self.to_port
        )
    }
}

/// What the output pseudo-node reports for ports nothing reached this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputHold {
    /// Keep the last value written.
    #[default]
    Latched,
    /// Zero all output ports at the start of each tick.
    Fresh,
}

/// Runtime options for a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemOptions {
    /// Wall-clock allowance per tick. Overruns are logged and counted,
    /// never treated as errors.
    pub tick_budget: Option<Duration>,
    pub output_hold: OutputHold,
}

/// Targets of one output port: target node -> target input port.
pub(crate) type PortTargets = BTreeMap<Node, usize>;

/// Forward adjacency: source -> source output port -> targets.
pub(crate) type Adjacency = BTreeMap<Node, BTreeMap<usize, PortTargets>>;

/// A graph of blocks with declared boundary ports.
#[derive(Debug, Clone, Default)]
pub struct System {
    /// Arena; a removed block leaves `None` so ids are never reused.
    pub(crate) blocks: Vec<Option<Block>>,
    pub(crate) adjacency: Adjacency,
    /// Per-node input buffers, including the output pseudo-node.
    pub(crate) pending: BTreeMap<Node, Vec<Signal>>,
    pub(crate) ninput: usize,
    pub(crate) noutput: usize,
    pub(crate) options: SystemOptions,
    pub(crate) stats: TickStats,
}

impl System {
    /// Empty system with the given boundary port counts.
    pub fn new(ninput: usize, noutput: usize) -> Self {
        let mut system = Self {
            ninput,
            noutput,
            ..Self::default()
        };
        system.pending.insert(Node::Output, zeros(noutput));
        system
    }

    /// System pre-populated with `blocks`, numbered from 0 in order.
    pub fn with_blocks(blocks: impl IntoIterator<Item = Block>, ninput: usize, noutput: usize) -> Self {
        let mut system = Self::new(ninput, noutput);
        system.add_blocks(blocks);
        system
    }

    pub fn with_options(mut self, options: SystemOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> SystemOptions {
        self.options
    }

    pub fn set_options(&mut self, options: SystemOptions) {
        self.options = options;
    }

    /// Add a block and return its id.
    ///
    /// Ids are assigned densely in insertion order and never recycled.
    pub fn add_block(&mut self, block: impl Into<Block>) -> BlockId {
        let block = block.into();
        let id = BlockId::from_index(self.blocks.len() as u32);
        self.pending.insert(Node::Block(id), zeros(block.num_inputs()));
        debug!(
            block = %id,
            kind = block.type_name(),
            inputs = block.num_inputs(),
            outputs = block.num_outputs(),
            "block added"
        );
        self.blocks.push(Some(block));
        id
    }

    pub fn add_blocks(&mut self, blocks: impl IntoIterator<Item = Block>) -> Vec<BlockId> {
        blocks.into_iter().map(|b| self.add_block(b)).collect()
    }

    /// Remove a block along with every edge into or out of it.
    pub fn remove_block(&mut self, id: BlockId) -> FlowResult<Block> {
        let block = self
            .blocks
            .get_mut(id.slot())
            .and_then(Option::take)
            .ok_or_else(|| FlowError::NotFound {
                what: format!("block {id}"),
            })?;

        let node = Node::Block(id);
        self.adjacency.remove(&node);
        for ports in self.adjacency.values_mut() {
            for targets in ports.values_mut() {
                targets.remove(&node);
            }
        }
        prune_empty(&mut self.adjacency);
        self.pending.remove(&node);

        debug!(block = %id, kind = block.type_name(), "block removed");
        Ok(block)
    }

    /// Same as [`System::remove_block`].
    pub fn remove_by_id(&mut self, id: BlockId) -> FlowResult<Block> {
        self.remove_block(id)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.slot()).and_then(Option::as_ref)
    }

    /// Mutable access for reconfiguring a block between ticks.
    ///
    /// If the block's input count changes, its pending buffer is zeroed on
    /// the next tick.
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(id.slot()).and_then(Option::as_mut)
    }

    /// Live blocks in id order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.as_ref().map(|b| (BlockId::from_index(i as u32), b)))
    }

    /// Number of live blocks.
    pub fn len(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `node` can currently be an edge endpoint.
    pub fn contains(&self, node: Node) -> bool {
        match node {
            Node::Input => self.ninput > 0,
            Node::Output => self.noutput > 0,
            Node::Block(id) => self.block(id).is_some(),
        }
    }

    /// `(input ports, output ports)` of a node.
    pub fn ports(&self, node: Node) -> FlowResult<(usize, usize)> {
        if !self.contains(node) {
            return Err(FlowError::NotFound {
                what: format!("node {node}"),
            });
        }
        Ok(match node {
            Node::Input => (0, self.ninput),
            Node::Output => (self.noutput, 0),
            Node::Block(id) => self
                .block(id)
                .map(|b| (b.num_inputs(), b.num_outputs()))
                .unwrap_or((0, 0)),
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.ninput
    }

    pub fn num_outputs(&self) -> usize {
        self.noutput
    }

    /// Change the boundary port counts.
    ///
    /// Edges touching boundary ports beyond the new counts are dropped.
    pub fn set_ports(&mut self, ninput: usize, noutput: usize) {
        self.ninput = ninput;
        self.noutput = noutput;

        if let Some(ports) = self.adjacency.get_mut(&Node::Input) {
            ports.retain(|port, _| *port < ninput);
        }
        for ports in self.adjacency.values_mut() {
            for targets in ports.values_mut() {
                targets.retain(|node, port| *node != Node::Output || *port < noutput);
            }
        }
        prune_empty(&mut self.adjacency);

        self.pending
            .entry(Node::Output)
            .or_default()
            .resize(noutput, Signal::zero());
        debug!(inputs = ninput, outputs = noutput, "system ports changed");
    }

    /// Wire `from:from_port` to `to:to_port`.
    ///
    /// One output port may feed several targets. Wiring the same source port
    /// to a target it already feeds moves that target's port.
    ///
    /// # Errors
    ///
    /// - `NotFound` if either endpoint does not exist
    /// - `PortOutOfRange` if a port index is beyond the endpoint's port count
    /// - `PortConflict` if the target port is already driven by another source
    ///
    /// On error the adjacency is unchanged.
    pub fn add_edge(
        &mut self,
        from: impl Into<Node>,
        from_port: usize,
        to: impl Into<Node>,
        to_port: usize,
    ) -> FlowResult<()> {
        let (from, to) = (from.into(), to.into());
        let (_, from_outputs) = self.ports(from)?;
        let (to_inputs, _) = self.ports(to)?;

        if from_port >= from_outputs {
            return Err(FlowError::PortOutOfRange {
                what: format!("output of {from}"),
                port: from_port,
                count: from_outputs,
            });
        }
        if to_port >= to_inputs {
            return Err(FlowError::PortOutOfRange {
                what: format!("input of {to}"),
                port: to_port,
                count: to_inputs,
            });
        }
        if let Some(driver) = self.driver_of(to, to_port)
            && (driver.from, driver.from_port) != (from, from_port)
        {
            return Err(FlowError::PortConflict {
                what: format!("{to}:{to_port} is already driven by {driver}"),
            });
        }

        self.adjacency
            .entry(from)
            .or_default()
            .entry(from_port)
            .or_default()
            .insert(to, to_port);
        debug!(%from, from_port, %to, to_port, "edge added");
        Ok(())
    }

    /// Wire port 0 of `from` to port 0 of `to`.
    pub fn connect(&mut self, from: impl Into<Node>, to: impl Into<Node>) -> FlowResult<()> {
        self.add_edge(from, 0, to, 0)
    }

    /// Remove the wire `from:from_port -> to:to_port`.
    pub fn remove_edge(
        &mut self,
        from: impl Into<Node>,
        from_port: usize,
        to: impl Into<Node>,
        to_port: usize,
    ) -> FlowResult<()> {
        let (from, to) = (from.into(), to.into());
        let targets = self
            .adjacency
            .get_mut(&from)
            .and_then(|ports| ports.get_mut(&from_port))
            .filter(|targets| targets.get(&to) == Some(&to_port))
            .ok_or_else(|| FlowError::NotFound {
                what: format!("edge {from}:{from_port} -> {to}:{to_port}"),
            })?;
        targets.remove(&to);
        prune_empty(&mut self.adjacency);
        debug!(%from, from_port, %to, to_port, "edge removed");
        Ok(())
    }

    /// Drop every edge; blocks and their ids stay.
    pub fn clear_edges(&mut self) {
        self.adjacency.clear();
        debug!("edges cleared");
    }

    /// All edges in source order.
    pub fn edges(&self) -> Vec<Edge> {
        self.adjacency
            .iter()
            .flat_map(|(&from, ports)| {
                ports.iter().flat_map(move |(&from_port, targets)| {
                    targets.iter().map(move |(&to, &to_port)| Edge {
                        from,
                        from_port,
                        to,
                        to_port,
                    })
                })
            })
            .collect()
    }

    /// Edges leaving `node`.
    pub fn successors(&self, node: Node) -> Vec<Edge> {
        self.edges().into_iter().filter(|e| e.from == node).collect()
    }

    /// The edge driving `to:to_port`, if any.
    pub fn driver_of(&self, to: Node, to_port: usize) -> Option<Edge> {
        self.edges()
            .into_iter()
            .find(|e| e.to == to && e.to_port == to_port)
    }

    /// Current pending buffer of a node.
    pub fn pending(&self, node: Node) -> Option<&[Signal]> {
        self.pending.get(&node).map(Vec::as_slice)
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }
}

fn prune_empty(adjacency: &mut Adjacency) {
    for ports in adjacency.values_mut() {
        ports.retain(|_, targets| !targets.is_empty());
    }
    adjacency.retain(|_, ports| !ports.is_empty());
}

impl SignalProcessor for System {
    fn num_inputs(&self) -> usize {
        self.ninput
    }

    fn num_outputs(&self) -> usize {
        self.noutput
    }

    /// Run one inner tick.
    fn set_input(&mut self, inputs: &[Signal]) -> FlowResult<()> {
        self.run(inputs).map(|_| ())
    }

    fn output(&self) -> FlowResult<Vec<Signal>> {
        Ok(self.pending(Node::Output).map(<[Signal]>::to_vec).unwrap_or_default())
    }

    /// Reset every block and zero every pending buffer.
    fn reset(&mut self) {
        for block in self.blocks.iter_mut().flatten() {
            block.reset();
        }
        for buffer in self.pending.values_mut() {
            buffer.iter_mut().for_each(|s| *s = Signal::zero());
        }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "System: {} input(s), {} output(s), {} block(s)",
            self.ninput,
            self.noutput,
            self.len()
        )?;
        writeln!(f, "ID\tType\tLabel")?;
        for (id, block) in self.blocks() {
            writeln!(f, "{id}\t{}\t{}", block.type_name(), block.label().unwrap_or("-"))?;
        }
        writeln!(f, "Edges:")?;
        for edge in self.edges() {
            writeln!(f, "  {edge}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::junction::Junction;
    use crate::matrix::MatrixBlock;
    use nalgebra::DMatrix;

    fn gain(k: f64) -> Block {
        MatrixBlock::new(DMatrix::from_element(1, 1, k)).unwrap().into()
    }

    #[test]
    fn node_parsing() {
        assert_eq!("input".parse::<Node>().unwrap(), Node::Input);
        assert_eq!("output".parse::<Node>().unwrap(), Node::Output);
        assert_eq!(
            "3".parse::<Node>().unwrap(),
            Node::Block(BlockId::from_index(3))
        );
        assert!(matches!(
            "nope".parse::<Node>(),
            Err(FlowError::NotFound { .. })
        ));
        assert_eq!(Node::Block(BlockId::from_index(7)).to_string(), "7");
    }

    #[test]
    fn pseudo_nodes_exist_only_with_ports() {
        let mut sys = System::new(0, 0);
        let a = sys.add_block(Block::identity());
        assert!(matches!(
            sys.add_edge(Node::Input, 0, a, 0),
            Err(FlowError::NotFound { .. })
        ));
        assert!(matches!(
            sys.add_edge(a, 0, Node::Output, 0),
            Err(FlowError::NotFound { .. })
        ));
        sys.set_ports(1, 1);
        sys.add_edge(Node::Input, 0, a, 0).unwrap();
        sys.add_edge(a, 0, Node::Output, 0).unwrap();
    }

    #[test]
    fn boundary_direction_enforced() {
        let mut sys = System::new(1, 1);
        let a = sys.add_block(Block::identity());
        assert!(matches!(
            sys.add_edge(a, 0, Node::Input, 0),
            Err(FlowError::PortOutOfRange { count: 0, .. })
        ));
        assert!(matches!(
            sys.add_edge(Node::Output, 0, a, 0),
            Err(FlowError::PortOutOfRange { count: 0, .. })
        ));
    }

    #[test]
    fn fan_out_and_fan_in_guard() {
        let mut sys = System::new(1, 2);
        let a = sys.add_block(gain(2.0));
        let b = sys.add_block(gain(3.0));
        sys.add_edge(Node::Input, 0, a, 0).unwrap();
        sys.add_edge(Node::Input, 0, b, 0).unwrap();
        assert_eq!(sys.successors(Node::Input).len(), 2);

        sys.add_edge(a, 0, Node::Output, 0).unwrap();
        let before = sys.edges();
        assert!(matches!(
            sys.add_edge(b, 0, Node::Output, 0),
            Err(FlowError::PortConflict { .. })
        ));
        assert_eq!(sys.edges(), before);

        // same source re-targeted to another port of the same node
        sys.add_edge(a, 0, Node::Output, 1).unwrap();
        assert_eq!(sys.driver_of(Node::Output, 0), None);
        assert_eq!(
            sys.driver_of(Node::Output, 1).map(|e| e.from),
            Some(Node::Block(a))
        );
    }

    #[test]
    fn remove_edge_requires_exact_match() {
        let mut sys = System::new(1, 1);
        let a = sys.add_block(Block::identity());
        sys.add_edge(Node::Input, 0, a, 0).unwrap();
        assert!(matches!(
            sys.remove_edge(a, 0, Node::Output, 0),
            Err(FlowError::NotFound { .. })
        ));
        sys.remove_edge(Node::Input, 0, a, 0).unwrap();
        assert!(sys.edges().is_empty());
        assert!(sys.adjacency.is_empty());
    }

    #[test]
    fn set_ports_prunes_boundary_edges() {
        let mut sys = System::new(2, 2);
        let j = sys.add_block(Junction::new("++").unwrap());
        sys.add_edge(Node::Input, 0, j, 0).unwrap();
        sys.add_edge(Node::Input, 1, j, 1).unwrap();
        sys.add_edge(j, 0, Node::Output, 1).unwrap();

        sys.set_ports(1, 1);
        assert_eq!(
            sys.edges(),
            vec![Edge {
                from: Node::Input,
                from_port: 0,
                to: Node::Block(j),
                to_port: 0,
            }]
        );
        assert_eq!(sys.pending(Node::Output).map(<[Signal]>::len), Some(1));
    }

    #[test]
    fn summary_lists_blocks_and_edges() {
        let mut sys = System::new(1, 1);
        let a = sys.add_block(gain(2.0).with_label("double"));
        sys.connect(Node::Input, a).unwrap();
        sys.connect(a, Node::Output).unwrap();
        let text = sys.to_string();
        assert!(text.contains("ID\tType\tLabel"));
        assert!(text.contains("0\tMatrix\tdouble"));
        assert!(text.contains("input:0 -> 0:0"));
        assert!(text.contains("0:0 -> output:0"));
    }
}
