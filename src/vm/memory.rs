//! Byte-addressed machine memory.
//!
//! Static data sits at the bottom, starting at [`DATA_BASE`]; the stack
//! grows down from the top. Addresses below `DATA_BASE` are never valid,
//! so a null pointer always faults.

use super::RuntimeError;

/// First address handed to static data.
pub const DATA_BASE: u32 = 16;

type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Clone)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    pub fn new(size: u32) -> Self {
        Self {
            bytes: vec![0; size as usize],
        }
    }

    /// One past the highest address.
    pub fn size(&self) -> u32 {
        self.bytes.len() as u32
    }

    fn range(&self, address: u32, width: u32) -> Result<std::ops::Range<usize>> {
        let end = address.checked_add(width);
        match end {
            Some(end) if address >= DATA_BASE && end <= self.size() => {
                Ok(address as usize..end as usize)
            }
            _ => Err(RuntimeError::BadAddress { address, width }),
        }
    }

    pub fn read_i32(&self, address: u32) -> Result<i32> {
        let range = self.range(address, 4)?;
        let mut word = [0; 4];
        word.copy_from_slice(&self.bytes[range]);
        Ok(i32::from_le_bytes(word))
    }

    pub fn write_i32(&mut self, address: u32, value: i32) -> Result<()> {
        let range = self.range(address, 4)?;
        self.bytes[range].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn read_f64(&self, address: u32) -> Result<f64> {
        let range = self.range(address, 8)?;
        let mut word = [0; 8];
        word.copy_from_slice(&self.bytes[range]);
        Ok(f64::from_le_bytes(word))
    }

    pub fn write_f64(&mut self, address: u32, value: f64) -> Result<()> {
        let range = self.range(address, 8)?;
        self.bytes[range].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn write_bytes(&mut self, address: u32, data: &[u8]) -> Result<()> {
        let range = self.range(address, data.len() as u32)?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    /// Reads the NUL-terminated string at `address`.
    pub fn read_c_string(&self, address: u32) -> Result<String> {
        let start = self.range(address, 1)?.start;
        let length = self.bytes[start..]
            .iter()
            .position(|&byte| byte == 0)
            .ok_or(RuntimeError::InvalidString(address))?;
        String::from_utf8(self.bytes[start..start + length].to_vec())
            .map_err(|_| RuntimeError::InvalidString(address))
    }
}
