use cocoa::base::{id, nil};
use cocoa::foundation::{NSAutoreleasePool, NSString};
use objc::{class, msg_send, sel, sel_impl};

/// Bundle identifier of the frontmost application, e.g. `com.apple.Safari`.
/// Uses NSWorkspace via Cocoa/ObjC; needs no accessibility permission.
pub fn frontmost_app_identifier() -> Option<String> {
    unsafe {
        let pool = NSAutoreleasePool::new(nil);

        let workspace: id = msg_send![class!(NSWorkspace), sharedWorkspace];
        let front_app: id = msg_send![workspace, frontmostApplication];

        let identifier = if front_app == nil {
            None
        } else {
            let bundle_id: id = msg_send![front_app, bundleIdentifier];
            if bundle_id == nil {
                None
            } else {
                let c_str = std::ffi::CStr::from_ptr(NSString::UTF8String(bundle_id));
                Some(c_str.to_string_lossy().into_owned())
            }
        };

        pool.drain();
        identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontmost_app_identifier_does_not_panic() {
        // Headless CI may have no frontmost app; only the call itself is checked
        if let Some(identifier) = frontmost_app_identifier() {
            assert!(!identifier.is_empty());
        }
    }
}
