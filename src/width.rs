//! # Bus Width Profiles
//!
//! A [`WidthProfile`] fixes the data bus width of a simulated machine and derives
//! every mask the rest of the crate works with. Three profiles are supported:
//!
//! | Data width | Address width | Data mask    | Address mask |
//! |-----------:|--------------:|-------------:|-------------:|
//! | 8 (6502)   | 16            | `0xFF`       | `0xFFFF`     |
//! | 16         | 32            | `0xFFFF`     | `0xFFFF_FFFF`|
//! | 32         | 32            | `0xFFFF_FFFF`| `0xFFFF_FFFF`|
//!
//! The profile is an explicit value owned by each engine instance. Changing it
//! means building a new memory, CPU and label table.

use thiserror::Error;

/// Data widths accepted by [`WidthProfile::new`].
pub const SUPPORTED_DATA_WIDTHS: [u32; 3] = [8, 16, 32];

/// Errors raised while choosing a machine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The requested data bus width is not one of 8, 16 or 32 bits.
    #[error("unsupported data width {0} (expected 8, 16 or 32)")]
    UnsupportedDataWidth(u32),

    /// A run batch must execute at least one instruction.
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
}

/// Derived bus geometry for one data width.
///
/// # Examples
///
/// ```
/// use sim6502::WidthProfile;
///
/// let profile = WidthProfile::new(16).unwrap();
/// assert_eq!(profile.address_width(), 32);
/// assert_eq!(profile.data_mask(), 0xFFFF);
/// assert_eq!(profile.sign_bit(), 0x8000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidthProfile {
    data_width: u32,
    address_width: u32,
    data_mask: u32,
    address_mask: u32,
}

impl WidthProfile {
    /// Builds the profile for `data_width` bits.
    pub fn new(data_width: u32) -> Result<Self, ConfigurationError> {
        if !SUPPORTED_DATA_WIDTHS.contains(&data_width) {
            return Err(ConfigurationError::UnsupportedDataWidth(data_width));
        }

        let address_width = if data_width > 16 {
            data_width
        } else {
            data_width * 2
        };

        // 4 * 2^(aw-2) - 1, computed wide so the 32-bit case does not overflow
        let data_mask = ((1u64 << data_width) - 1) as u32;
        let address_mask = (4 * (1u64 << (address_width - 2)) - 1) as u32;

        Ok(Self {
            data_width,
            address_width,
            data_mask,
            address_mask,
        })
    }

    /// The classic 6502 profile: 8-bit data, 16-bit addresses.
    pub const fn eight_bit() -> Self {
        Self {
            data_width: 8,
            address_width: 16,
            data_mask: 0xFF,
            address_mask: 0xFFFF,
        }
    }

    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    pub fn address_width(&self) -> u32 {
        self.address_width
    }

    /// `2^data_width - 1`. Every register and memory cell is reduced by it.
    pub fn data_mask(&self) -> u32 {
        self.data_mask
    }

    /// Highest addressable cell. Also the program counter mask.
    pub fn address_mask(&self) -> u32 {
        self.address_mask
    }

    /// Bit holding the N flag and the sign of a data value.
    pub fn sign_bit(&self) -> u32 {
        1 << (self.data_width - 1)
    }

    /// Bit holding the V flag (one below the sign bit).
    pub fn overflow_bit(&self) -> u32 {
        1 << (self.data_width - 2)
    }

    /// Base address of the stack bank.
    ///
    /// The stack lives at `2^data_width + SP`, which is the familiar page one
    /// on the 8-bit machine. The 32-bit machine has no room above the data
    /// range, so its stack sits at `SP` itself.
    pub fn stack_base(&self) -> u32 {
        if self.data_width < 32 {
            1 << self.data_width
        } else {
            0
        }
    }

    /// Number of cells an absolute address occupies in the instruction stream.
    pub fn address_limbs(&self) -> u32 {
        if self.data_width < 32 {
            2
        } else {
            1
        }
    }

    /// Hex digits needed to print one data cell.
    pub fn data_digits(&self) -> usize {
        (self.data_width / 4) as usize
    }

    /// Hex digits needed to print one address.
    pub fn address_digits(&self) -> usize {
        (self.address_width / 4) as usize
    }

    /// Reinterprets a data value as signed over the data-mask half range.
    pub fn to_signed(&self, value: u32) -> i64 {
        let value = (value & self.data_mask) as i64;
        if value > (self.data_mask / 2) as i64 {
            value - (self.data_mask as i64 + 1)
        } else {
            value
        }
    }

    /// Adds a signed displacement to an address, wrapping within the address mask.
    pub fn offset_address(&self, address: u32, offset: i64) -> u32 {
        let modulus = self.address_mask as i64 + 1;
        (address as i64 + offset).rem_euclid(modulus) as u32
    }
}

impl Default for WidthProfile {
    fn default() -> Self {
        Self::eight_bit()
    }
}
