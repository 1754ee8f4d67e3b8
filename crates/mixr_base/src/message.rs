//! Message severity types and per-object filter masks

use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::sync::atomic::{AtomicU16, Ordering};

/// Bit set of message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MessageType(u16);

impl MessageType {
    pub const NONE: MessageType = MessageType(0x0000);
    pub const ERROR: MessageType = MessageType(0x0001);
    pub const WARNING: MessageType = MessageType(0x0002);
    pub const INFO: MessageType = MessageType(0x0004);
    pub const DEBUG: MessageType = MessageType(0x0008);
    pub const DATA: MessageType = MessageType(0x0010);
    /// User-defined message types occupy the upper byte
    pub const USER: MessageType = MessageType(0xFF00);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: MessageType) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: MessageType) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parse a message type name as used in configuration documents.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "error" => Some(Self::ERROR),
            "warning" => Some(Self::WARNING),
            "info" => Some(Self::INFO),
            "debug" => Some(Self::DEBUG),
            "data" => Some(Self::DATA),
            "user" => Some(Self::USER),
            _ => None,
        }
    }
}

impl BitOr for MessageType {
    type Output = MessageType;

    fn bitor(self, rhs: Self) -> Self {
        MessageType(self.0 | rhs.0)
    }
}

impl BitOrAssign for MessageType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for MessageType {
    type Output = MessageType;

    fn bitand(self, rhs: Self) -> Self {
        MessageType(self.0 & rhs.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Filter Masks
// ─────────────────────────────────────────────────────────────────────────────

/// Paired enable/disable masks.
///
/// The two masks never share a bit, and the error bit can be neither
/// disabled nor reported as disabled.
#[derive(Debug)]
pub struct MessageFilter {
    enabled: AtomicU16,
    disabled: AtomicU16,
}

impl MessageFilter {
    pub fn new() -> Self {
        Self {
            enabled: AtomicU16::new((MessageType::ERROR | MessageType::WARNING).bits()),
            disabled: AtomicU16::new(MessageType::NONE.bits()),
        }
    }

    pub fn enabled(&self) -> MessageType {
        MessageType(self.enabled.load(Ordering::Relaxed))
    }

    pub fn disabled(&self) -> MessageType {
        MessageType(self.disabled.load(Ordering::Relaxed))
    }

    /// Error messages are always enabled; otherwise any requested bit in the
    /// enabled mask counts.
    pub fn is_enabled(&self, kind: MessageType) -> bool {
        kind.intersects(MessageType::ERROR) || self.enabled().intersects(kind)
    }

    pub fn is_disabled(&self, kind: MessageType) -> bool {
        let kind = MessageType(kind.0 & !MessageType::ERROR.0);
        self.disabled().intersects(kind)
    }

    /// True if none of `kind`'s bits were explicitly enabled or disabled.
    pub fn is_untouched(&self, kind: MessageType) -> bool {
        !(self.enabled() | self.disabled()).intersects(kind)
    }

    pub fn enable(&self, kind: MessageType) {
        self.enabled.fetch_or(kind.0, Ordering::Relaxed);
        self.disabled.fetch_and(!kind.0, Ordering::Relaxed);
    }

    pub fn disable(&self, kind: MessageType) {
        let kind = kind.0 & !MessageType::ERROR.0;
        self.disabled.fetch_or(kind, Ordering::Relaxed);
        self.enabled.fetch_and(!kind, Ordering::Relaxed);
    }

    /// Copy both masks from another filter.
    pub fn copy_from(&self, other: &MessageFilter) {
        self.enabled.store(other.enabled().bits(), Ordering::Relaxed);
        self.disabled.store(other.disabled().bits(), Ordering::Relaxed);
    }
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MessageFilter {
    fn clone(&self) -> Self {
        let filter = Self::new();
        filter.copy_from(self);
        filter
    }
}
