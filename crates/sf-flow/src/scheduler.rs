//! One tick of a system: breadth-first propagation from the input boundary.
//!
//! Each tick seeds the blocks wired to the system inputs, then drains a FIFO
//! queue. A block is visited at most once per tick. An edge into a block
//! that was already visited still writes the target's pending buffer, but
//! the value is consumed only on the next tick: every feedback path is
//! delayed by exactly one tick.

use std::collections::{BTreeMap, VecDeque};

use sf_core::BlockId;
use sf_core::timing::{TickBudget, Timer};
use tracing::{debug, trace, warn};

use crate::block::{SignalProcessor, expect_ports};
use crate::error::{FlowError, FlowResult};
use crate::signal::{Signal, zeros};
use crate::system::{Adjacency, Node, OutputHold, System};

impl System {
    /// Run one tick with one value per system input port.
    ///
    /// Returns the output boundary values, or `None` if the system declares
    /// no output ports. On error the pending buffers are restored to their
    /// contents before the tick; block state that already advanced stays
    /// advanced.
    ///
    /// # Errors
    ///
    /// - `Unconfigured` if the system has no input ports
    /// - `ShapeMismatch` if `inputs` has the wrong length, or a block rejects
    ///   its input
    /// - `PortOutOfRange` if a block was reconfigured to fewer ports than an
    ///   edge still uses
    pub fn run(&mut self, inputs: &[Signal]) -> FlowResult<Option<Vec<Signal>>> {
        let timer = Timer::start("tick");
        let snapshot = self.pending.clone();

        match self.tick(inputs) {
            Ok(visited) => {
                let label = timer.label();
                let elapsed = timer.stop();
                let overrun = self
                    .options
                    .tick_budget
                    .map(TickBudget::new)
                    .and_then(|budget| budget.overrun(elapsed));
                if let Some(over) = overrun {
                    warn!(
                        tick = self.stats.ticks,
                        elapsed_us = elapsed.as_micros() as u64,
                        over_us = over.as_micros() as u64,
                        "{label} exceeded budget"
                    );
                }
                self.stats.record(elapsed, overrun.is_some());
                debug!(
                    tick = self.stats.ticks,
                    visited,
                    elapsed_us = elapsed.as_micros() as u64,
                    "tick complete"
                );
                Ok(self.output_values())
            }
            Err(err) => {
                self.pending = snapshot;
                self.stats.record_failure();
                debug!(error = %err, "tick failed, pending buffers restored");
                Err(err)
            }
        }
    }

    /// Propagate one tick. Returns the number of blocks visited.
    fn tick(&mut self, inputs: &[Signal]) -> FlowResult<usize> {
        if self.ninput == 0 {
            return Err(FlowError::Unconfigured {
                what: "system has no input ports",
            });
        }
        expect_ports("system input ports", self.ninput, inputs)?;
        self.align_pending();

        let mut queue = VecDeque::new();
        let mut visited = vec![false; self.blocks.len()];
        let mut count = 0;

        deliver(&self.adjacency, &mut self.pending, Node::Input, inputs, &mut queue)?;

        while let Some(id) = queue.pop_front() {
            let slot = id.slot();
            if visited[slot] {
                continue;
            }
            visited[slot] = true;

            let Some(block) = self.blocks.get_mut(slot).and_then(Option::as_mut) else {
                continue;
            };
            let node = Node::Block(id);
            let input = self.pending.get(&node).cloned().unwrap_or_default();
            let output = block.call(&input)?;
            trace!(block = %id, kind = block.type_name(), "block visited");
            count += 1;

            deliver(&self.adjacency, &mut self.pending, node, &output, &mut queue)?;
        }

        Ok(count)
    }

    /// Resize buffers of blocks whose input count changed since the last
    /// tick, and apply the output hold policy.
    fn align_pending(&mut self) {
        for (slot, block) in self.blocks.iter().enumerate() {
            let Some(block) = block else {
                continue;
            };
            let n = block.num_inputs();
            let buffer = self
                .pending
                .entry(Node::Block(BlockId::from_index(slot as u32)))
                .or_default();
            if buffer.len() != n {
                debug!(block = slot, from = buffer.len(), to = n, "pending buffer reset");
                *buffer = zeros(n);
            }
        }

        let output = self.pending.entry(Node::Output).or_default();
        match self.options.output_hold {
            OutputHold::Latched => output.resize(self.noutput, Signal::zero()),
            OutputHold::Fresh => *output = zeros(self.noutput),
        }
    }

    fn output_values(&self) -> Option<Vec<Signal>> {
        if self.noutput == 0 {
            return None;
        }
        self.pending.get(&Node::Output).cloned()
    }
}

/// Write `values` along every edge leaving `from` and queue the targets.
///
/// The output pseudo-node is written but never queued.
fn deliver(
    adjacency: &Adjacency,
    pending: &mut BTreeMap<Node, Vec<Signal>>,
    from: Node,
    values: &[Signal],
    queue: &mut VecDeque<BlockId>,
) -> FlowResult<()> {
    let Some(ports) = adjacency.get(&from) else {
        return Ok(());
    };
    for (&port, targets) in ports {
        let value = values.get(port).ok_or_else(|| FlowError::PortOutOfRange {
            what: format!("output of {from}"),
            port,
            count: values.len(),
        })?;
        for (&target, &to_port) in targets {
            let buffer = pending.get_mut(&target).ok_or_else(|| FlowError::NotFound {
                what: format!("pending buffer of {target}"),
            })?;
            let count = buffer.len();
            let slot = buffer
                .get_mut(to_port)
                .ok_or_else(|| FlowError::PortOutOfRange {
                    what: format!("input of {target}"),
                    port: to_port,
                    count,
                })?;
            *slot = value.clone();
            if let Node::Block(id) = target {
                queue.push_back(id);
            }
        }
    }
    Ok(())
}
