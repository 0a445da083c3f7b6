//! FTP status code definitions

// Success codes (2xx)
pub const FILE_STATUS: u16 = 213;
pub const SERVICE_READY: u16 = 220;
pub const PASSIVE_MODE: u16 = 227;
pub const USER_LOGGED_IN: u16 = 230;

/// Check if status code indicates a preliminary reply (another reply follows)
pub fn is_preliminary(code: u16) -> bool {
    (100..200).contains(&code)
}

/// Check if status code indicates success
pub fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

/// Check if status code indicates the server wants more input
pub fn is_intermediate(code: u16) -> bool {
    (300..400).contains(&code)
}

/// Check if status code indicates error
pub fn is_error(code: u16) -> bool {
    code >= 400
}
