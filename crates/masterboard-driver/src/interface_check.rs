//! 网络接口状态检查模块
//!
//! 使用 ioctl 系统调用检查 Linux 网络接口是否存在且已启动（UP 状态）。
//! 主控板通过以太网/WiFi 网卡通信，打开接口前先确认网卡可用。
//!
//! 此模块仅提供检查功能，不进行任何配置操作，因此不需要特殊权限。

use crate::error::DriverError;
use libc::{AF_INET, IFF_UP, SIOCGIFFLAGS, SOCK_DGRAM, c_short, if_nametoindex, ifreq};
use std::ffi::CString;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use tracing::trace;

/// ifr_name 为 IFNAMSIZ = 16 字节（含结尾 NUL）
const MAX_IFACE_NAME_LEN: usize = 15;

/// 检查网络接口是否存在且已启动（管理态 UP）
///
/// # 返回值
/// - `Ok(true)`: 接口存在且 IFF_UP 标志位为真
/// - `Ok(false)`: 接口存在但处于 DOWN 状态
/// - `Err(DriverError::InvalidInterface)`: 接口名为空、过长或包含 NUL
/// - `Err(DriverError::InterfaceNotFound)`: 接口不存在
/// - `Err(DriverError::Io)`: 系统调用失败（socket/ioctl 错误）
pub fn check_interface_status(interface: &str) -> Result<bool, DriverError> {
    let name = interface_name(interface)?;

    if unsafe { if_nametoindex(name.as_ptr()) } == 0 {
        trace!(
            "if_nametoindex({}) failed: {}",
            interface,
            io::Error::last_os_error()
        );
        return Err(DriverError::InterfaceNotFound(interface.to_string()));
    }

    let flags = interface_flags(&name)?;
    let is_up = i32::from(flags) & IFF_UP != 0;
    trace!("Interface '{}' flags {:#06x}, up: {}", interface, flags, is_up);
    Ok(is_up)
}

/// 校验接口名并转换为 C 字符串
fn interface_name(interface: &str) -> Result<CString, DriverError> {
    if interface.is_empty() {
        return Err(DriverError::InvalidInterface(
            "interface name is empty".to_string(),
        ));
    }
    if interface.len() > MAX_IFACE_NAME_LEN {
        return Err(DriverError::InvalidInterface(format!(
            "'{}' is too long (max {} characters)",
            interface, MAX_IFACE_NAME_LEN
        )));
    }
    CString::new(interface)
        .map_err(|e| DriverError::InvalidInterface(format!("{:?}: {}", interface, e)))
}

/// 通过 `SIOCGIFFLAGS` 读取接口标志位
fn interface_flags(name: &CString) -> io::Result<c_short> {
    let raw = unsafe { libc::socket(AF_INET, SOCK_DGRAM, 0) };
    if raw < 0 {
        return Err(io::Error::last_os_error());
    }
    // 关闭由 OwnedFd 负责
    let socket = unsafe { OwnedFd::from_raw_fd(raw) };

    let mut request: ifreq = unsafe { std::mem::zeroed() };
    // 长度已校验，结尾 NUL 一并写入
    for (dst, &src) in request.ifr_name.iter_mut().zip(name.as_bytes_with_nul()) {
        *dst = src as libc::c_char;
    }

    if unsafe { libc::ioctl(socket.as_raw_fd(), SIOCGIFFLAGS, &mut request as *mut ifreq) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { request.ifr_ifru.ifru_flags })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_check_interface_status_loopback() {
        if !Path::new("/sys/class/net/lo").exists() {
            eprintln!("Skipping test: lo does not exist");
            return;
        }

        match check_interface_status("lo") {
            Ok(is_up) => assert!(is_up, "lo should be UP"),
            Err(e) => panic!("check_interface_status should succeed for lo: {:?}", e),
        }
    }

    #[test]
    fn test_check_interface_status_not_exists() {
        let result = check_interface_status("mbs999");
        match result {
            Err(DriverError::InterfaceNotFound(name)) => assert_eq!(name, "mbs999"),
            other => panic!("Expected InterfaceNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_check_interface_status_invalid_name() {
        let result = check_interface_status("eth0\0");
        assert!(
            matches!(result, Err(DriverError::InvalidInterface(_))),
            "NUL byte must be rejected, got: {:?}",
            result
        );
    }

    #[test]
    fn test_check_interface_status_too_long_name() {
        let too_long_name = "a".repeat(20);
        match check_interface_status(&too_long_name) {
            Err(DriverError::InvalidInterface(msg)) => {
                assert!(msg.contains("too long"), "got: {}", msg)
            },
            other => panic!("Expected InvalidInterface, got: {:?}", other),
        }
    }

    #[test]
    fn test_interface_name_at_length_limit() {
        let name = interface_name(&"a".repeat(MAX_IFACE_NAME_LEN)).unwrap();
        assert_eq!(name.as_bytes_with_nul().len(), MAX_IFACE_NAME_LEN + 1);
    }

    #[test]
    fn test_check_interface_status_empty_name() {
        assert!(matches!(
            check_interface_status(""),
            Err(DriverError::InvalidInterface(_))
        ));
    }
}
