// Chope — SPIFFS mount
//
// Registers the SPIFFS partition with the VFS so clips can be opened with
// plain `std::fs`.  Formats the partition if it cannot be mounted.

use std::ffi::CString;

use esp_idf_sys::{esp, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register};

use crate::config::*;

pub fn mount() -> anyhow::Result<()> {
    let base_path = CString::new(SPIFFS_MOUNT)?;
    let conf = esp_vfs_spiffs_conf_t {
        base_path: base_path.as_ptr(),
        partition_label: core::ptr::null(),
        max_files: SPIFFS_MAX_FILES,
        format_if_mount_failed: true,
    };

    // SAFETY: `conf` and `base_path` outlive the call; the VFS copies the path.
    esp!(unsafe { esp_vfs_spiffs_register(&conf) })?;

    log::info!("SPIFFS mounted at {}", SPIFFS_MOUNT);
    Ok(())
}
