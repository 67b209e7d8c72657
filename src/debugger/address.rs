use std::fmt::{Display, Formatter};

/// Address in the debugee address space as reported by gdb.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Address(u64);

impl Address {
    /// Gdb never reports a zero address for a real location.
    pub const INVALID: Address = Address(0);

    /// Parse hexadecimal gdb representation like `0x00000000004011d6`.
    /// Anything that is not a hex number gives [`Address::INVALID`].
    pub fn parse(s: &str) -> Address {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Address::INVALID;
        }
        u64::from_str_radix(digits, 16)
            .map(Address)
            .unwrap_or(Address::INVALID)
    }

    pub fn is_valid(self) -> bool {
        self != Address::INVALID
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for Address {
    fn from(addr: u64) -> Self {
        Address(addr)
    }
}

impl From<Address> for u64 {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!("{:#x}", self.0))
    }
}

/// Half-open address range.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AddressRange {
    pub from: Address,
    pub to: Address,
}

impl AddressRange {
    pub fn new(from: impl Into<Address>, to: impl Into<Address>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.from.is_valid() && self.to.is_valid()
    }
}
