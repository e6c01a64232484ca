use serde_json::Value;

use super::AddressError;

/// Base of the secure domain's view of the local address space.
pub const SECURE_DOMAIN_BASE_OFFSET: u64 = 0x0E00_0000;

/// A hardware description node that carries registers.
pub trait RegisterNode: Sized {
    /// Address of the node's first `reg` entry.
    fn first_register_address(&self) -> Result<u64, AddressError>;

    fn parent(&self) -> Option<Self>;
}

impl RegisterNode for Value {
    fn first_register_address(&self) -> Result<u64, AddressError> {
        let first = self
            .get("regs")
            .and_then(Value::as_array)
            .and_then(|regs| regs.first())
            .ok_or(AddressError::NoRegisters)?;

        first
            .get("addr")
            .and_then(Value::as_u64)
            .ok_or(AddressError::InvalidAddress)
    }

    fn parent(&self) -> Option<Self> {
        self.get("parent").filter(|p| p.is_object()).cloned()
    }
}

/// Computes absolute addresses of hardware description nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressResolver {
    base_offset: u64,
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self::new(SECURE_DOMAIN_BASE_OFFSET)
    }
}

impl AddressResolver {
    pub fn new(base_offset: u64) -> Self {
        Self { base_offset }
    }

    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Returns the absolute address of `node`.
    ///
    /// With `use_offset` the configured base offset is added to the node's
    /// first register address; without it the register address is returned
    /// as is.
    pub fn resolve<N: RegisterNode>(&self, node: &N, use_offset: bool) -> Result<u64, AddressError> {
        // The address should be `node.parent().parent()` first register plus
        // the node's own, but the exported trees carry a wrong grandparent
        // `reg`, so the flat base offset stands in for it. Keep this until
        // the upstream devicetree data is fixed.
        let address = node.first_register_address()?;
        if !use_offset {
            return Ok(address);
        }

        self.base_offset
            .checked_add(address)
            .ok_or(AddressError::Overflow {
                base_offset: self.base_offset,
                address,
            })
    }
}
