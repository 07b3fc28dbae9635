//! Pointer-chain resolution against a live connection.
//!
//! A chain `[o0, o1, ..., on]` from base `b` resolves as
//!
//! ```text
//! p1 = *(b + o0)
//! p2 = *(p1 + o1)
//! ...
//! address = pn + on        (the last offset is added, not dereferenced)
//! ```
//!
//! Every hop is one round trip and depends on the value read by the previous
//! one, so hops are issued strictly in order. Nothing is cached: the target
//! may relocate a structure between two calls (reload, menu transition).

use tracing::{debug, trace};

use crate::connection::SwitchConnection;
use crate::error::{Error, Result};
use crate::offset::{ChainBase, ChainName, OffsetCatalog, PointerChain, ShiftName};
use crate::shutdown::ShutdownSignal;

/// Absolute address produced by walking a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub address: u64,
    pub base: u64,
    pub offsets: Vec<i64>,
}

impl ResolvedAddress {
    /// Address of a field a fixed number of bytes into the structure
    pub fn shifted(&self, shift: u32) -> u64 {
        self.address.wrapping_add(u64::from(shift))
    }
}

/// Walk `offsets` from `base`.
///
/// Fails with [`Error::NullPointer`] if an intermediate read yields zero and
/// with a connectivity error if the transport fails; no later hop is issued
/// in either case.
pub fn resolve<C: SwitchConnection + ?Sized>(
    conn: &mut C,
    base: u64,
    offsets: &[i64],
) -> Result<ResolvedAddress> {
    walk(conn, base, offsets, None)
}

/// Like [`resolve`], but checks `shutdown` before every hop and aborts with
/// [`Error::Cancelled`] once it is triggered.
pub fn resolve_cancellable<C: SwitchConnection + ?Sized>(
    conn: &mut C,
    base: u64,
    offsets: &[i64],
    shutdown: &ShutdownSignal,
) -> Result<ResolvedAddress> {
    walk(conn, base, offsets, Some(shutdown))
}

/// Resolve a chain, looking up its starting base first
pub fn resolve_chain<C: SwitchConnection + ?Sized>(
    conn: &mut C,
    catalog: &OffsetCatalog,
    chain: &PointerChain,
    shutdown: Option<&ShutdownSignal>,
) -> Result<ResolvedAddress> {
    let base = match chain.base {
        ChainBase::Main => conn.main_base()?,
        ChainBase::Base(name) => catalog.base(name)?,
        ChainBase::Absolute(address) => address,
    };
    walk(conn, base, &chain.offsets, shutdown)
}

/// Resolve a named chain of `catalog`
pub fn resolve_named<C: SwitchConnection + ?Sized>(
    conn: &mut C,
    catalog: &OffsetCatalog,
    name: ChainName,
    shutdown: Option<&ShutdownSignal>,
) -> Result<ResolvedAddress> {
    let chain = catalog.chain(name)?;
    debug!("Resolving {} ({})", name, catalog.key());
    resolve_chain(conn, catalog, chain, shutdown)
}

/// Resolve a chain and read `length` bytes at the result
pub fn read_chain<C: SwitchConnection + ?Sized>(
    conn: &mut C,
    catalog: &OffsetCatalog,
    chain: &PointerChain,
    length: usize,
    shutdown: Option<&ShutdownSignal>,
) -> Result<Vec<u8>> {
    let resolved = resolve_chain(conn, catalog, chain, shutdown)?;
    conn.read_bytes(resolved.address, length)
        .map_err(|e| as_connectivity(e, resolved.address))
}

/// Resolve a named chain and read `length` bytes at the result
pub fn read_named<C: SwitchConnection + ?Sized>(
    conn: &mut C,
    catalog: &OffsetCatalog,
    name: ChainName,
    length: usize,
    shutdown: Option<&ShutdownSignal>,
) -> Result<Vec<u8>> {
    let chain = catalog.chain(name)?;
    debug!("Reading {} bytes at {} ({})", length, name, catalog.key());
    read_chain(conn, catalog, chain, length, shutdown)
}

/// Resolve a named chain and read one byte at a fixed shift into it
pub fn read_shifted_byte<C: SwitchConnection + ?Sized>(
    conn: &mut C,
    catalog: &OffsetCatalog,
    chain: ChainName,
    shift: ShiftName,
    shutdown: Option<&ShutdownSignal>,
) -> Result<u8> {
    let shift = catalog.shift(shift)?;
    let resolved = resolve_named(conn, catalog, chain, shutdown)?;
    let address = resolved.shifted(shift);
    let bytes = conn
        .read_bytes(address, 1)
        .map_err(|e| as_connectivity(e, address))?;
    bytes.first().copied().ok_or_else(|| Error::Connection {
        address,
        message: "empty read".to_string(),
    })
}

fn walk<C: SwitchConnection + ?Sized>(
    conn: &mut C,
    base: u64,
    offsets: &[i64],
    shutdown: Option<&ShutdownSignal>,
) -> Result<ResolvedAddress> {
    let (last, hops) = offsets.split_last().ok_or(Error::EmptyChain)?;

    let mut current = base;
    for (hop, offset) in hops.iter().enumerate() {
        if let Some(reason) = shutdown.and_then(ShutdownSignal::reason) {
            debug!("Pointer walk cancelled before hop {} ({})", hop, reason);
            return Err(Error::Cancelled(reason));
        }

        let address = offset_address(current, *offset, hop)?;
        let value = conn
            .read_pointer(address)
            .map_err(|e| as_connectivity(e, address))?;
        trace!("hop {}: [{:#x}] -> {:#x}", hop, address, value);

        if value == 0 {
            return Err(Error::NullPointer { hop, address });
        }
        current = value;
    }

    let address = offset_address(current, *last, hops.len())?;
    Ok(ResolvedAddress {
        address,
        base,
        offsets: offsets.to_vec(),
    })
}

fn offset_address(current: u64, offset: i64, hop: usize) -> Result<u64> {
    current
        .checked_add_signed(offset)
        .ok_or(Error::AddressOverflow {
            hop,
            current,
            offset,
        })
}

/// Transports may surface raw IO errors; the resolver reports them as
/// connectivity failures at the address being read.
fn as_connectivity(err: Error, address: u64) -> Error {
    match err {
        Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => Error::Timeout { address },
        Error::Io(e) => Error::Connection {
            address,
            message: e.to_string(),
        },
        other => other,
    }
}
