//! Windows uninstall-key enumeration.
//!
//! Reads `DisplayName` from every subkey of the machine-wide uninstall roots,
//! then `DisplayVersion`, `InstallLocation` and `Language` from the accepted ones.

use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;

use tracing::debug;
use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS};
use windows_sys::Win32::System::Registry::{
    RegCloseKey, RegEnumKeyExW, RegOpenKeyExW, RegQueryValueExW, HKEY, HKEY_LOCAL_MACHINE,
    KEY_READ, REG_DWORD, REG_EXPAND_SZ, REG_SZ,
};

use super::{InstallRegistry, RegistryEntry};
use crate::core::error::{HostError, HostResult};

const UNINSTALL_ROOTS: [&str; 2] = [
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
    r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
];

/// Longest registry key name, plus the terminator.
const MAX_KEY_NAME: usize = 256;

#[derive(Debug, Clone)]
pub struct UninstallRegistry {
    roots: Vec<String>,
}

impl Default for UninstallRegistry {
    fn default() -> Self {
        Self {
            roots: UNINSTALL_ROOTS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl UninstallRegistry {
    fn collect(
        &self,
        accept: &dyn Fn(&str) -> bool,
    ) -> HostResult<Vec<HostResult<RegistryEntry>>> {
        let mut entries = Vec::new();
        let mut opened_any = false;

        for root_path in &self.roots {
            let root = match Key::open(HKEY_LOCAL_MACHINE, root_path) {
                Ok(root) => root,
                Err(code) => {
                    debug!("Uninstall root {} not readable (error {})", root_path, code);
                    continue;
                }
            };
            opened_any = true;

            for name in root.subkey_names() {
                if let Some(entry) = read_entry(&root, &name, accept).transpose() {
                    entries.push(entry);
                }
            }
        }

        if !opened_any {
            return Err(HostError::RegistryUnavailable(
                "no uninstall root could be opened".to_string(),
            ));
        }
        Ok(entries)
    }
}

impl InstallRegistry for UninstallRegistry {
    fn entries(&self) -> HostResult<Vec<HostResult<RegistryEntry>>> {
        self.collect(&|_: &str| true)
    }

    fn entries_named(
        &self,
        accept: &dyn Fn(&str) -> bool,
    ) -> HostResult<Vec<HostResult<RegistryEntry>>> {
        self.collect(accept)
    }
}

/// Read one uninstall subkey. The remaining values are only read once the
/// display name has been accepted, so unrelated applications never fail.
fn read_entry(
    root: &Key,
    name: &str,
    accept: &dyn Fn(&str) -> bool,
) -> HostResult<Option<RegistryEntry>> {
    let failure = |reason: String| HostError::RegistryEntry {
        key: name.to_string(),
        reason,
    };

    let key = Key::open(root.0, name).map_err(|code| failure(format!("open failed ({code})")))?;
    let display_name = match key.string_value("DisplayName") {
        Ok(Some(display_name)) if accept(&display_name) => display_name,
        Ok(_) => return Ok(None),
        Err(reason) => {
            debug!("Unreadable display name under {}: {}", name, reason);
            return Ok(None);
        }
    };

    Ok(Some(RegistryEntry {
        key: name.to_string(),
        display_name: Some(display_name),
        display_version: key.string_value("DisplayVersion").map_err(&failure)?,
        install_location: key.string_value("InstallLocation").map_err(&failure)?,
        language: key.dword_value("Language").map_err(&failure)?,
    }))
}

fn wide(value: &str) -> Vec<u16> {
    OsStr::new(value)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Open registry key, closed on drop.
struct Key(HKEY);

impl Key {
    fn open(parent: HKEY, path: &str) -> Result<Self, u32> {
        let path = wide(path);
        let mut handle: HKEY = std::ptr::null_mut();
        // SAFETY: `path` is NUL-terminated and `handle` is a valid out pointer.
        let status = unsafe { RegOpenKeyExW(parent, path.as_ptr(), 0, KEY_READ, &mut handle) };
        if status != ERROR_SUCCESS {
            return Err(status);
        }
        Ok(Self(handle))
    }

    fn subkey_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut index = 0u32;
        loop {
            let mut buffer = [0u16; MAX_KEY_NAME];
            let mut len = buffer.len() as u32;
            // SAFETY: `buffer` holds `len` UTF-16 units; optional outputs are null.
            let status = unsafe {
                RegEnumKeyExW(
                    self.0,
                    index,
                    buffer.as_mut_ptr(),
                    &mut len,
                    std::ptr::null(),
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                )
            };
            if status == ERROR_NO_MORE_ITEMS {
                break;
            }
            if status == ERROR_SUCCESS {
                names.push(String::from_utf16_lossy(&buffer[..len as usize]));
            } else {
                debug!("Skipping uninstall subkey #{} (error {})", index, status);
            }
            index += 1;
        }
        names
    }

    /// Raw value bytes and type; `None` when the value does not exist.
    fn raw_value(&self, name: &str) -> Result<Option<(u32, Vec<u8>)>, String> {
        let name_w = wide(name);
        let mut value_type = 0u32;
        let mut size = 0u32;
        // SAFETY: size query only; the data pointer is null.
        let status = unsafe {
            RegQueryValueExW(
                self.0,
                name_w.as_ptr(),
                std::ptr::null(),
                &mut value_type,
                std::ptr::null_mut(),
                &mut size,
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status != ERROR_SUCCESS {
            return Err(format!("{name}: query failed ({status})"));
        }

        let mut data = vec![0u8; size as usize];
        // SAFETY: `data` is writable for `size` bytes.
        let status = unsafe {
            RegQueryValueExW(
                self.0,
                name_w.as_ptr(),
                std::ptr::null(),
                &mut value_type,
                data.as_mut_ptr(),
                &mut size,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(format!("{name}: read failed ({status})"));
        }
        data.truncate(size as usize);
        Ok(Some((value_type, data)))
    }

    fn string_value(&self, name: &str) -> Result<Option<String>, String> {
        let Some((value_type, data)) = self.raw_value(name)? else {
            return Ok(None);
        };
        if value_type != REG_SZ && value_type != REG_EXPAND_SZ {
            return Err(format!("{name}: expected a string value (type {value_type})"));
        }
        let units: Vec<u16> = data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let value = String::from_utf16_lossy(&units);
        Ok(Some(value.trim_end_matches('\0').to_string()))
    }

    fn dword_value(&self, name: &str) -> Result<Option<u32>, String> {
        let Some((value_type, data)) = self.raw_value(name)? else {
            return Ok(None);
        };
        if value_type != REG_DWORD || data.len() < 4 {
            return Err(format!("{name}: expected a DWORD value (type {value_type})"));
        }
        Ok(Some(u32::from_le_bytes([data[0], data[1], data[2], data[3]])))
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        // SAFETY: the handle came from RegOpenKeyExW and is closed exactly once.
        unsafe {
            RegCloseKey(self.0);
        }
    }
}
