//! Scripted in-memory connection for tests and snapshot replay.

use std::collections::HashMap;

use super::{POINTER_SIZE, SwitchConnection};
use crate::error::{Error, Result};

/// Failure injected at a given read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The transport closed mid-read
    Disconnect,
    /// The read did not complete in time
    Timeout,
}

/// Connection backed by a pointer table and byte regions.
///
/// Every read (pointer or bytes) is appended to a read log so tests can
/// assert exactly which addresses were touched and in which order.
#[derive(Debug, Clone)]
pub struct MockConnection {
    name: String,
    label: String,
    main_base: u64,
    pointers: HashMap<u64, u64>,
    regions: Vec<(u64, Vec<u8>)>,
    fault: Option<(usize, Fault)>,
    reads: Vec<u64>,
    writes: Vec<(u64, Vec<u8>)>,
}

impl MockConnection {
    pub fn builder() -> MockConnectionBuilder {
        MockConnectionBuilder::default()
    }

    /// Addresses read so far, in order
    pub fn reads(&self) -> &[u64] {
        &self.reads
    }

    /// Writes performed so far, in order
    pub fn writes(&self) -> &[(u64, Vec<u8>)] {
        &self.writes
    }

    pub fn set_pointer(&mut self, address: u64, value: u64) {
        self.pointers.insert(address, value);
    }

    fn begin_read(&mut self, address: u64) -> Result<()> {
        let index = self.reads.len();
        self.reads.push(address);

        match self.fault {
            Some((at, Fault::Disconnect)) if at == index => Err(Error::Connection {
                address,
                message: "connection closed by remote".to_string(),
            }),
            Some((at, Fault::Timeout)) if at == index => Err(Error::Timeout { address }),
            _ => Ok(()),
        }
    }

    fn region_slice(&self, address: u64, length: usize) -> Option<&[u8]> {
        self.regions.iter().find_map(|(start, data)| {
            let offset = usize::try_from(address.checked_sub(*start)?).ok()?;
            let end = offset.checked_add(length)?;
            data.get(offset..end)
        })
    }
}

impl SwitchConnection for MockConnection {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }

    fn main_base(&mut self) -> Result<u64> {
        Ok(self.main_base)
    }

    fn read_pointer(&mut self, address: u64) -> Result<u64> {
        self.begin_read(address)?;

        if let Some(value) = self.pointers.get(&address) {
            return Ok(*value);
        }

        let bytes = self
            .region_slice(address, POINTER_SIZE)
            .ok_or_else(|| unmapped(address))?;
        let mut buf = [0u8; POINTER_SIZE];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    fn read_bytes(&mut self, address: u64, length: usize) -> Result<Vec<u8>> {
        self.begin_read(address)?;
        self.region_slice(address, length)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| unmapped(address))
    }

    fn write_bytes(&mut self, address: u64, data: &[u8]) -> Result<()> {
        self.writes.push((address, data.to_vec()));

        for (start, region) in &mut self.regions {
            let range = address
                .checked_sub(*start)
                .and_then(|offset| usize::try_from(offset).ok())
                .and_then(|offset| Some(offset..offset.checked_add(data.len())?));
            if let Some(target) = range.and_then(|range| region.get_mut(range)) {
                target.copy_from_slice(data);
                return Ok(());
            }
        }

        self.regions.push((address, data.to_vec()));
        Ok(())
    }
}

fn unmapped(address: u64) -> Error {
    Error::Connection {
        address,
        message: "unmapped address".to_string(),
    }
}

/// Builder for [`MockConnection`]
#[derive(Debug, Clone, Default)]
pub struct MockConnectionBuilder {
    name: Option<String>,
    main_base: u64,
    pointers: HashMap<u64, u64>,
    regions: Vec<(u64, Vec<u8>)>,
    fault: Option<(usize, Fault)>,
}

impl MockConnectionBuilder {
    /// Transport name; also the initial label
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn main_base(mut self, address: u64) -> Self {
        self.main_base = address;
        self
    }

    /// Make `read_pointer(address)` return `value`
    pub fn pointer(mut self, address: u64, value: u64) -> Self {
        self.pointers.insert(address, value);
        self
    }

    /// Map `data` at `address` for byte reads
    pub fn region(mut self, address: u64, data: Vec<u8>) -> Self {
        self.regions.push((address, data));
        self
    }

    /// Fail the read with the given zero-based index
    pub fn fail_at_read(mut self, index: usize, fault: Fault) -> Self {
        self.fault = Some((index, fault));
        self
    }

    pub fn build(self) -> MockConnection {
        let name = self.name.unwrap_or_else(|| "mock".to_string());
        MockConnection {
            label: name.clone(),
            name,
            main_base: self.main_base,
            pointers: self.pointers,
            regions: self.regions,
            fault: self.fault,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }
}
