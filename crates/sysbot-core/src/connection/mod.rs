//! Live connection to a target game process.
//!
//! The transport itself (sys-botbase over TCP, USB bulk transfers) lives
//! outside this crate. Everything here talks to the target through
//! [`SwitchConnection`], which hands out exclusive `&mut` access so two
//! pointer walks can never interleave on the same channel.

mod mock;

pub use mock::{Fault, MockConnection, MockConnectionBuilder};

use crate::error::{Error, Result};

/// Size in bytes of a pointer in the target process
pub const POINTER_SIZE: usize = 8;

pub trait SwitchConnection {
    /// Transport-level name (e.g. the console IP), fixed for the connection lifetime
    fn name(&self) -> &str;

    /// Human-readable label used for log filing
    fn label(&self) -> &str;

    fn set_label(&mut self, label: String);

    /// Load address of the main executable
    fn main_base(&mut self) -> Result<u64>;

    /// Read a pointer-sized little-endian value at an absolute address
    fn read_pointer(&mut self, address: u64) -> Result<u64> {
        let bytes = self.read_bytes(address, POINTER_SIZE)?;
        if bytes.len() < POINTER_SIZE {
            return Err(Error::Connection {
                address,
                message: format!("short read: {} of {} bytes", bytes.len(), POINTER_SIZE),
            });
        }
        let mut buf = [0u8; POINTER_SIZE];
        buf.copy_from_slice(&bytes[..POINTER_SIZE]);
        Ok(u64::from_le_bytes(buf))
    }

    fn read_bytes(&mut self, address: u64, length: usize) -> Result<Vec<u8>>;

    fn write_bytes(&mut self, address: u64, data: &[u8]) -> Result<()>;
}

impl<C: SwitchConnection + ?Sized> SwitchConnection for &mut C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn label(&self) -> &str {
        (**self).label()
    }

    fn set_label(&mut self, label: String) {
        (**self).set_label(label)
    }

    fn main_base(&mut self) -> Result<u64> {
        (**self).main_base()
    }

    fn read_pointer(&mut self, address: u64) -> Result<u64> {
        (**self).read_pointer(address)
    }

    fn read_bytes(&mut self, address: u64, length: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(address, length)
    }

    fn write_bytes(&mut self, address: u64, data: &[u8]) -> Result<()> {
        (**self).write_bytes(address, data)
    }
}
