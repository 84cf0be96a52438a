use std::time::Duration;

/// Byte order used to encode extended length fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Network byte order. The default for all network presets.
    #[default]
    Big,
    Little,
}

impl ByteOrder {
    /// The byte order of the machine running this process.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }

    pub(crate) fn put_u16(self, buf: &mut [u8; 2], value: u16) {
        *buf = match self {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        };
    }

    pub(crate) fn get_u16(self, buf: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Big => u16::from_be_bytes(buf),
            ByteOrder::Little => u16::from_le_bytes(buf),
        }
    }

    pub(crate) fn put_u64(self, buf: &mut [u8; 8], value: u64) {
        *buf = match self {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        };
    }

    pub(crate) fn get_u64(self, buf: [u8; 8]) -> u64 {
        match self {
            ByteOrder::Big => u64::from_be_bytes(buf),
            ByteOrder::Little => u64::from_le_bytes(buf),
        }
    }
}

/// Message-boundary behavior of the underlying transport.
///
/// The framing layer adapts per direction:
/// - [`Protocol::BinaryStream`]: boundaries are not preserved (e.g. TCP);
///   a length prefix is added.
/// - [`Protocol::SeqPacket`] / [`Protocol::Datagram`]: boundaries are
///   preserved; framing is pass-through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    BinaryStream,
    SeqPacket,
    Datagram,
}

impl Protocol {
    pub fn preserves_boundary(self) -> bool {
        matches!(self, Protocol::SeqPacket | Protocol::Datagram)
    }
}

/// How the framing layer reacts to a would-block signal that carried no
/// progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Surface the signal to the caller immediately.
    #[default]
    Nonblock,
    /// Yield the thread cooperatively, then reissue the transport call.
    Yield,
    /// Sleep for the duration, then reissue the transport call.
    Sleep(Duration),
}

impl RetryPolicy {
    /// Signed-delay form: negative is non-block, zero yields, positive
    /// sleeps for that many milliseconds.
    pub fn from_delay_millis(millis: i64) -> Self {
        match millis {
            m if m < 0 => RetryPolicy::Nonblock,
            0 => RetryPolicy::Yield,
            m => RetryPolicy::Sleep(Duration::from_millis(m as u64)),
        }
    }
}

/// Named transport presets.
///
/// Single source of truth, transport → (protocol, byte order):
/// - TCP / Unix stream → binary stream, big endian
/// - UDP / Unix packet → datagram, big endian
/// - WebSocket / SCTP  → seq-packet, big endian (boundaries preserved;
///   framing is pass-through)
/// - Local             → binary stream, native byte order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
    WebSocket,
    Sctp,
    UnixStream,
    UnixPacket,
    Local,
}

impl Transport {
    pub fn defaults(self) -> (Protocol, ByteOrder) {
        match self {
            Transport::Tcp | Transport::UnixStream => (Protocol::BinaryStream, ByteOrder::Big),
            Transport::Udp | Transport::UnixPacket => (Protocol::Datagram, ByteOrder::Big),
            Transport::WebSocket | Transport::Sctp => (Protocol::SeqPacket, ByteOrder::Big),
            Transport::Local => (Protocol::BinaryStream, ByteOrder::native()),
        }
    }
}

/// Framing configuration, immutable once a reader/writer/forwarder is
/// constructed.
#[derive(Clone, Copy, Debug)]
pub struct FrameOptions {
    pub read_order: ByteOrder,
    pub write_order: ByteOrder,
    pub read_protocol: Protocol,
    pub write_protocol: Protocol,
    /// Maximum accepted payload length in bytes. Zero means no limit.
    pub read_limit: u64,
    pub retry: RetryPolicy,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            read_order: ByteOrder::Big,
            write_order: ByteOrder::Big,
            read_protocol: Protocol::BinaryStream,
            write_protocol: Protocol::BinaryStream,
            read_limit: 0,
            retry: RetryPolicy::Nonblock,
        }
    }
}

impl FrameOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure both directions from a named transport preset.
    pub fn for_transport(transport: Transport) -> Self {
        Self::new().transport(transport)
    }

    pub fn transport(self, transport: Transport) -> Self {
        self.read_transport(transport).write_transport(transport)
    }

    pub fn read_transport(mut self, transport: Transport) -> Self {
        let (protocol, order) = transport.defaults();
        self.read_protocol = protocol;
        self.read_order = order;
        self
    }

    pub fn write_transport(mut self, transport: Transport) -> Self {
        let (protocol, order) = transport.defaults();
        self.write_protocol = protocol;
        self.write_order = order;
        self
    }

    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.read_order = order;
        self.write_order = order;
        self
    }

    pub fn read_byte_order(mut self, order: ByteOrder) -> Self {
        self.read_order = order;
        self
    }

    pub fn write_byte_order(mut self, order: ByteOrder) -> Self {
        self.write_order = order;
        self
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.read_protocol = protocol;
        self.write_protocol = protocol;
        self
    }

    pub fn read_protocol(mut self, protocol: Protocol) -> Self {
        self.read_protocol = protocol;
        self
    }

    pub fn write_protocol(mut self, protocol: Protocol) -> Self {
        self.write_protocol = protocol;
        self
    }

    /// Cap the payload length accepted by the read side. Zero disables
    /// the limit.
    pub fn read_limit(mut self, limit: u64) -> Self {
        self.read_limit = limit;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_nonblocking_big_endian_stream() {
        let opts = FrameOptions::default();
        assert_eq!(opts.read_order, ByteOrder::Big);
        assert_eq!(opts.write_order, ByteOrder::Big);
        assert_eq!(opts.read_protocol, Protocol::BinaryStream);
        assert_eq!(opts.write_protocol, Protocol::BinaryStream);
        assert_eq!(opts.read_limit, 0);
        assert_eq!(opts.retry, RetryPolicy::Nonblock);
    }

    #[test]
    fn boundary_preservation_by_protocol() {
        assert!(!Protocol::BinaryStream.preserves_boundary());
        assert!(Protocol::SeqPacket.preserves_boundary());
        assert!(Protocol::Datagram.preserves_boundary());
    }

    #[test]
    fn transport_preset_table() {
        assert_eq!(
            Transport::Tcp.defaults(),
            (Protocol::BinaryStream, ByteOrder::Big)
        );
        assert_eq!(
            Transport::UnixStream.defaults(),
            (Protocol::BinaryStream, ByteOrder::Big)
        );
        assert_eq!(
            Transport::Udp.defaults(),
            (Protocol::Datagram, ByteOrder::Big)
        );
        assert_eq!(
            Transport::UnixPacket.defaults(),
            (Protocol::Datagram, ByteOrder::Big)
        );
        assert_eq!(
            Transport::WebSocket.defaults(),
            (Protocol::SeqPacket, ByteOrder::Big)
        );
        assert_eq!(
            Transport::Sctp.defaults(),
            (Protocol::SeqPacket, ByteOrder::Big)
        );
        assert_eq!(
            Transport::Local.defaults(),
            (Protocol::BinaryStream, ByteOrder::native())
        );
    }

    #[test]
    fn per_direction_presets() {
        let opts = FrameOptions::new()
            .read_transport(Transport::Tcp)
            .write_transport(Transport::Udp);
        assert_eq!(opts.read_protocol, Protocol::BinaryStream);
        assert_eq!(opts.write_protocol, Protocol::Datagram);

        let opts = FrameOptions::for_transport(Transport::Sctp);
        assert_eq!(opts.read_protocol, Protocol::SeqPacket);
        assert_eq!(opts.write_protocol, Protocol::SeqPacket);
    }

    #[test]
    fn per_direction_protocol_and_order() {
        let opts = FrameOptions::new()
            .read_protocol(Protocol::Datagram)
            .write_protocol(Protocol::BinaryStream)
            .read_byte_order(ByteOrder::Little)
            .write_byte_order(ByteOrder::Big);
        assert_eq!(opts.read_protocol, Protocol::Datagram);
        assert_eq!(opts.write_protocol, Protocol::BinaryStream);
        assert_eq!(opts.read_order, ByteOrder::Little);
        assert_eq!(opts.write_order, ByteOrder::Big);
    }

    #[test]
    fn retry_policy_from_signed_delay() {
        assert_eq!(RetryPolicy::from_delay_millis(-1), RetryPolicy::Nonblock);
        assert_eq!(RetryPolicy::from_delay_millis(0), RetryPolicy::Yield);
        assert_eq!(
            RetryPolicy::from_delay_millis(25),
            RetryPolicy::Sleep(Duration::from_millis(25))
        );
    }

    #[test]
    fn byte_order_helpers_round_trip() {
        let mut two = [0u8; 2];
        ByteOrder::Big.put_u16(&mut two, 0x0102);
        assert_eq!(two, [0x01, 0x02]);
        assert_eq!(ByteOrder::Big.get_u16(two), 0x0102);

        ByteOrder::Little.put_u16(&mut two, 0x0102);
        assert_eq!(two, [0x02, 0x01]);
        assert_eq!(ByteOrder::Little.get_u16(two), 0x0102);

        let mut eight = [0u8; 8];
        ByteOrder::Big.put_u64(&mut eight, 0x0102030405060708);
        assert_eq!(eight, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(ByteOrder::Big.get_u64(eight), 0x0102030405060708);
        ByteOrder::Little.put_u64(&mut eight, 0x0102030405060708);
        assert_eq!(ByteOrder::Little.get_u64(eight), 0x0102030405060708);
    }

    #[test]
    fn native_order_matches_target() {
        if cfg!(target_endian = "little") {
            assert_eq!(ByteOrder::native(), ByteOrder::Little);
        } else {
            assert_eq!(ByteOrder::native(), ByteOrder::Big);
        }
    }
}
