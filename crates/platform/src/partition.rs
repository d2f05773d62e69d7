//! A/B slot partition arithmetic
//!
//! The device keeps two root/kernel partition pairs: root partitions 3 and
//! 5, each preceded by its kernel partition (2 and 4). An update always
//! installs into the inactive pair.

use otad_errors::{Error, PlatformError};

const SLOT_A_ROOT: u32 = 3;
const SLOT_B_ROOT: u32 = 5;

/// Derive the inactive root partition from the booted root partition.
///
/// `/dev/sda3` installs to `/dev/sda5` and vice versa.
///
/// # Errors
///
/// Returns `DeviceLookupFailed` if the device carries no partition number
/// or the partition is not one of the two root slots.
pub fn install_device_of_boot_device(boot_device: &str) -> Result<String, Error> {
    let (base, partition) = split_partition(boot_device)?;
    let target = match partition {
        SLOT_A_ROOT => SLOT_B_ROOT,
        SLOT_B_ROOT => SLOT_A_ROOT,
        other => {
            return Err(lookup_failed(
                boot_device,
                format!("partition {other} is not a root slot"),
            ))
        }
    };
    Ok(format!("{base}{target}"))
}

/// Derive the kernel partition paired with a root partition.
///
/// Kernel partitions sit directly before their root partition, so
/// `/dev/sda5` pairs with `/dev/sda4`.
///
/// # Errors
///
/// Returns `DeviceLookupFailed` if the device carries no partition number
/// or the partition is not one of the two root slots.
pub fn kernel_device_of_boot_device(root_device: &str) -> Result<String, Error> {
    let (base, partition) = split_partition(root_device)?;
    if partition != SLOT_A_ROOT && partition != SLOT_B_ROOT {
        return Err(lookup_failed(
            root_device,
            format!("partition {partition} is not a root slot"),
        ));
    }
    Ok(format!("{base}{}", partition - 1))
}

/// Split a device path into its base and trailing partition number.
fn split_partition(device: &str) -> Result<(&str, u32), Error> {
    let digits_at = device
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    let (base, digits) = device.split_at(digits_at);
    if base.is_empty() || digits.is_empty() {
        return Err(lookup_failed(
            device,
            "expected a device path ending in a partition number".to_string(),
        ));
    }
    let partition = digits
        .parse::<u32>()
        .map_err(|e| lookup_failed(device, format!("bad partition number: {e}")))?;
    Ok((base, partition))
}

fn lookup_failed(device: &str, message: String) -> Error {
    PlatformError::DeviceLookupFailed {
        device: device.to_string(),
        message,
    }
    .into()
}
