//! View-port contract.
//!
//! A view port is a named mount point. On commit the router hands every
//! replaced view port its [`ViewPortInstruction`] through
//! [`ViewPort::process`]; with `wait_to_swap` set, the visible swap is held
//! back and done through [`ViewPort::swap`] once every sibling at the same
//! router level has processed.

use crate::error::Result;
use crate::instruction::ViewPortInstruction;
use async_trait::async_trait;

#[async_trait]
pub trait ViewPort: Send + Sync + 'static {
    /// Prepare the new component. Swaps right away unless `wait_to_swap`.
    async fn process(&self, instruction: &ViewPortInstruction, wait_to_swap: bool) -> Result<()>;

    /// Show the component prepared by `process`.
    fn swap(&self, instruction: &ViewPortInstruction);
}
