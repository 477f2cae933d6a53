//! Owner lookup through the process access token. Fails quietly for
//! processes of other accounts when we lack PROCESS_QUERY_LIMITED_INFORMATION.

use super::ProcessOwner;
use std::ffi::c_void;
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::Security::{
    GetTokenInformation, LookupAccountSidW, TokenUser, SID_NAME_USE, TOKEN_QUERY, TOKEN_USER,
};
use windows::Win32::System::Threading::{
    OpenProcess, OpenProcessToken, PROCESS_QUERY_LIMITED_INFORMATION,
};

const NAME_CAPACITY: usize = 256;

pub fn owner_of(pid: u32) -> Option<ProcessOwner> {
    unsafe {
        let process = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid).ok()?;
        let owner = process_owner(process);
        let _ = CloseHandle(process);
        owner
    }
}

unsafe fn process_owner(process: HANDLE) -> Option<ProcessOwner> {
    let mut token = HANDLE::default();
    OpenProcessToken(process, TOKEN_QUERY, &mut token).ok()?;
    let owner = token_owner(token);
    let _ = CloseHandle(token);
    owner
}

unsafe fn token_owner(token: HANDLE) -> Option<ProcessOwner> {
    let mut needed = 0u32;
    // Sizing call, always fails with ERROR_INSUFFICIENT_BUFFER
    let _ = GetTokenInformation(token, TokenUser, None, 0, &mut needed);
    if needed == 0 {
        return None;
    }

    // usize-backed buffer keeps TOKEN_USER pointer-aligned
    let words = (needed as usize).div_ceil(std::mem::size_of::<usize>());
    let mut buffer = vec![0usize; words];
    GetTokenInformation(
        token,
        TokenUser,
        Some(buffer.as_mut_ptr() as *mut c_void),
        needed,
        &mut needed,
    )
    .ok()?;
    let token_user = &*(buffer.as_ptr() as *const TOKEN_USER);

    let mut name = [0u16; NAME_CAPACITY];
    let mut name_len = NAME_CAPACITY as u32;
    let mut domain = [0u16; NAME_CAPACITY];
    let mut domain_len = NAME_CAPACITY as u32;
    let mut sid_use = SID_NAME_USE::default();

    LookupAccountSidW(
        PCWSTR::null(),
        token_user.User.Sid,
        PWSTR(name.as_mut_ptr()),
        &mut name_len,
        PWSTR(domain.as_mut_ptr()),
        &mut domain_len,
        &mut sid_use,
    )
    .ok()?;

    let domain = String::from_utf16_lossy(&domain[..domain_len as usize]);
    Some(ProcessOwner {
        domain: (!domain.is_empty()).then_some(domain),
        user: String::from_utf16_lossy(&name[..name_len as usize]),
    })
}
