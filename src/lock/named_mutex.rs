//! Windows named mutex backend
//! The mutex carries a NULL DACL so instances running under other
//! accounts can still observe that the name exists.

use super::{CreateOutcome, LockBackend};
use crate::error::{AloneError, Result};
use crate::name::LockIdentity;
use std::ffi::c_void;
use windows::core::HSTRING;
use windows::Win32::Foundation::{CloseHandle, GetLastError, ERROR_ALREADY_EXISTS, HANDLE};
use windows::Win32::Security::{
    InitializeSecurityDescriptor, SetSecurityDescriptorDacl, PSECURITY_DESCRIPTOR,
    SECURITY_ATTRIBUTES, SECURITY_DESCRIPTOR,
};
use windows::Win32::System::SystemServices::SECURITY_DESCRIPTOR_REVISION;
use windows::Win32::System::Threading::{CreateMutexW, ReleaseMutex};

/// Owned mutex handle; ownership was requested at creation
#[derive(Debug)]
pub struct MutexHandle(HANDLE);

#[derive(Debug, Clone, Copy, Default)]
pub struct NamedMutexBackend;

pub(crate) fn to_io_error(err: windows::core::Error) -> std::io::Error {
    // HRESULT_FROM_WIN32 keeps the Win32 code in the low word
    std::io::Error::from_raw_os_error(err.code().0 & 0xFFFF)
}

impl LockBackend for NamedMutexBackend {
    type Handle = MutexHandle;

    fn create(&self, identity: &LockIdentity) -> Result<CreateOutcome<MutexHandle>> {
        let lock_error = |err: windows::core::Error| AloneError::LockCreate {
            name: identity.name().to_string(),
            source: to_io_error(err),
        };

        let mut descriptor = SECURITY_DESCRIPTOR::default();
        let psd = PSECURITY_DESCRIPTOR(&mut descriptor as *mut _ as *mut c_void);
        let name = HSTRING::from(identity.name());

        unsafe {
            InitializeSecurityDescriptor(psd, SECURITY_DESCRIPTOR_REVISION).map_err(lock_error)?;
            // NULL DACL: every account may open the object
            SetSecurityDescriptorDacl(psd, true, None, false).map_err(lock_error)?;

            let attributes = SECURITY_ATTRIBUTES {
                nLength: std::mem::size_of::<SECURITY_ATTRIBUTES>() as u32,
                lpSecurityDescriptor: psd.0,
                bInheritHandle: false.into(),
            };

            let handle = CreateMutexW(
                Some(&attributes as *const SECURITY_ATTRIBUTES),
                true,
                &name,
            )
            .map_err(lock_error)?;

            // Nothing may run between CreateMutexW and this check
            if GetLastError() == ERROR_ALREADY_EXISTS {
                let _ = CloseHandle(handle);
                return Ok(CreateOutcome::AlreadyExists);
            }

            Ok(CreateOutcome::Created(MutexHandle(handle)))
        }
    }

    fn release(&self, handle: MutexHandle) {
        unsafe {
            if let Err(e) = ReleaseMutex(handle.0) {
                tracing::warn!("ReleaseMutex failed: {}", e);
            }
            let _ = CloseHandle(handle.0);
        }
    }
}
