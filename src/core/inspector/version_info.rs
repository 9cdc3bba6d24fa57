// ─── Version Resource Reader ───
// Reads the StringFileInfo block of a PE executable's VS_VERSIONINFO resource.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::HostResult;

/// The raw version strings an executable carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVersionStrings {
    pub product_name: String,
    pub file_version: String,
    pub product_version: String,
}

/// Source of embedded version strings for an executable.
pub trait VersionInfoReader: Send + Sync {
    fn read(&self, path: &Path) -> HostResult<FileVersionStrings>;
}

/// Reads version resources through the Win32 version API.
///
/// On other platforms every read reports `MetadataUnreadable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32VersionInfoReader;

impl VersionInfoReader for Win32VersionInfoReader {
    fn read(&self, path: &Path) -> HostResult<FileVersionStrings> {
        #[cfg(windows)]
        {
            win32::read_version_strings(path)
        }

        #[cfg(not(windows))]
        {
            Err(crate::core::error::HostError::MetadataUnreadable {
                path: path.to_path_buf(),
                reason: "version resources can only be read on Windows".to_string(),
            })
        }
    }
}

#[cfg(windows)]
mod win32 {
    use std::ffi::c_void;
    use std::os::windows::ffi::OsStrExt;
    use std::path::Path;

    use windows_sys::Win32::Storage::FileSystem::{
        GetFileVersionInfoSizeW, GetFileVersionInfoW, VerQueryValueW,
    };

    use super::FileVersionStrings;
    use crate::core::error::{HostError, HostResult};

    /// en-US, Unicode: the table most installers write when no translation is listed.
    const FALLBACK_TRANSLATION: (u16, u16) = (0x0409, 0x04b0);

    fn wide(value: &std::ffi::OsStr) -> Vec<u16> {
        value.encode_wide().chain(std::iter::once(0)).collect()
    }

    pub fn read_version_strings(path: &Path) -> HostResult<FileVersionStrings> {
        let unreadable = |reason: &str| HostError::MetadataUnreadable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let file_name = wide(path.as_os_str());
        let mut handle = 0u32;
        // SAFETY: `file_name` is a NUL-terminated UTF-16 buffer that outlives the call.
        let size = unsafe { GetFileVersionInfoSizeW(file_name.as_ptr(), &mut handle) };
        if size == 0 {
            return Err(unreadable("no version resource"));
        }

        let mut block = vec![0u8; size as usize];
        // SAFETY: `block` is writable for exactly `size` bytes.
        let ok = unsafe {
            GetFileVersionInfoW(
                file_name.as_ptr(),
                0,
                size,
                block.as_mut_ptr() as *mut c_void,
            )
        };
        if ok == 0 {
            return Err(unreadable("version resource could not be loaded"));
        }

        let (lang, codepage) = translation(&block).unwrap_or(FALLBACK_TRANSLATION);
        let string_value = |key: &str| {
            query_string(
                &block,
                &format!("\\StringFileInfo\\{:04x}{:04x}\\{}", lang, codepage, key),
            )
        };

        Ok(FileVersionStrings {
            product_name: string_value("ProductName").unwrap_or_default(),
            file_version: string_value("FileVersion").unwrap_or_default(),
            product_version: string_value("ProductVersion").unwrap_or_default(),
        })
    }

    fn query(block: &[u8], sub_block: &str) -> Option<(*const c_void, u32)> {
        let sub_block = wide(std::ffi::OsStr::new(sub_block));
        let mut buffer: *mut c_void = std::ptr::null_mut();
        let mut len = 0u32;
        // SAFETY: `block` holds a version resource filled by GetFileVersionInfoW;
        // the returned pointer points into `block`.
        let ok = unsafe {
            VerQueryValueW(
                block.as_ptr() as *const c_void,
                sub_block.as_ptr(),
                &mut buffer,
                &mut len,
            )
        };
        if ok == 0 || buffer.is_null() || len == 0 {
            return None;
        }
        Some((buffer as *const c_void, len))
    }

    fn translation(block: &[u8]) -> Option<(u16, u16)> {
        let (ptr, len) = query(block, "\\VarFileInfo\\Translation")?;
        if (len as usize) < 4 {
            return None;
        }
        // SAFETY: at least 4 bytes are readable at `ptr`; the read tolerates misalignment.
        let pair = unsafe { std::ptr::read_unaligned(ptr as *const [u16; 2]) };
        Some((pair[0], pair[1]))
    }

    fn query_string(block: &[u8], sub_block: &str) -> Option<String> {
        let (ptr, len) = query(block, sub_block)?;
        // SAFETY: for string values `len` counts UTF-16 units inside `block`.
        let units = unsafe { std::slice::from_raw_parts(ptr as *const u16, len as usize) };
        let value = String::from_utf16_lossy(units);
        Some(value.trim_end_matches('\0').trim().to_string())
    }
}
