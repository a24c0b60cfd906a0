//! Third-party ANSI support detection.
//!
//! Tools like ConEmu and ANSICON hook the console from inside the process and
//! translate escape codes themselves; running our own translation on top of
//! theirs would double-process every sequence. The probe checks the loaded
//! module list once at session start and must never block or fail the
//! session.

/// Console-hooking DLLs known to provide their own ANSI translation.
const ANSI_HOOK_MODULES: [&str; 5] = [
    "conemuhk.dll",
    "conemuhk64.dll",
    "ansi.dll",
    "ansi32.dll",
    "ansi64.dll",
];

/// Name of the first known ANSI-providing module loaded into this process,
/// if any.
#[cfg(windows)]
pub fn ansi_hook_module() -> Option<&'static str> {
    use std::ffi::CString;

    use windows::core::PCSTR;
    use windows::Win32::System::LibraryLoader::GetModuleHandleA;

    for name in ANSI_HOOK_MODULES {
        let Ok(name_z) = CString::new(name) else {
            continue;
        };
        if unsafe { GetModuleHandleA(PCSTR(name_z.as_ptr().cast())) }.is_ok() {
            return Some(name);
        }
    }
    None
}

#[cfg(not(windows))]
pub fn ansi_hook_module() -> Option<&'static str> {
    None
}

/// Whether escape code translation should run this session: off when a hook
/// module already provides it, otherwise whatever the configuration says.
pub fn resolve_ansi(configured: bool, hook_module: Option<&str>) -> bool {
    match hook_module {
        Some(_) => false,
        None => configured,
    }
}
