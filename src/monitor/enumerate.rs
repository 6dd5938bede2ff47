use crate::error::NativeError;

use super::types::MonitorRect;

/// Enumerate all monitors currently connected to the system.
///
/// Uses `EnumDisplayMonitors` to walk every active display and collect its
/// full bounds (taskbar area included).
#[cfg(windows)]
pub fn enumerate_monitors() -> Result<Vec<MonitorRect>, NativeError> {
    use windows::Win32::Foundation::{LPARAM, RECT};
    use windows::Win32::Graphics::Gdi::{
        EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO,
    };

    unsafe extern "system" fn enum_proc(
        hmonitor: HMONITOR,
        _hdc: HDC,
        _rect: *mut RECT,
        lparam: LPARAM,
    ) -> windows::core::BOOL {
        unsafe {
            let monitors = &mut *(lparam.0 as *mut Vec<MonitorRect>);

            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if GetMonitorInfoW(hmonitor, &mut info).as_bool() {
                let rc = info.rcMonitor;
                monitors.push(MonitorRect::new(rc.left, rc.top, rc.right, rc.bottom));
            }

            windows::core::BOOL(1) // continue enumeration
        }
    }

    let mut monitors: Vec<MonitorRect> = Vec::new();
    let ok = unsafe {
        EnumDisplayMonitors(
            None,
            None,
            Some(enum_proc),
            LPARAM(&mut monitors as *mut Vec<MonitorRect> as isize),
        )
    };
    if !ok.as_bool() {
        return Err(NativeError::call(
            "EnumDisplayMonitors",
            windows::core::Error::from_thread(),
        ));
    }
    if monitors.is_empty() {
        return Err(NativeError::NoMonitors);
    }
    Ok(monitors)
}

/// Bounds of the primary display (the one containing the origin).
#[cfg(windows)]
pub fn primary_monitor() -> Option<MonitorRect> {
    use windows::Win32::Foundation::POINT;
    use windows::Win32::Graphics::Gdi::{
        GetMonitorInfoW, MONITOR_DEFAULTTOPRIMARY, MONITORINFO, MonitorFromPoint,
    };

    unsafe {
        let hmonitor = MonitorFromPoint(POINT { x: 0, y: 0 }, MONITOR_DEFAULTTOPRIMARY);
        let mut info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        if !GetMonitorInfoW(hmonitor, &mut info).as_bool() {
            return None;
        }
        let rc = info.rcMonitor;
        Some(MonitorRect::new(rc.left, rc.top, rc.right, rc.bottom))
    }
}

#[cfg(not(windows))]
pub fn enumerate_monitors() -> Result<Vec<MonitorRect>, NativeError> {
    Err(NativeError::NoMonitors)
}

#[cfg(not(windows))]
pub fn primary_monitor() -> Option<MonitorRect> {
    None
}
