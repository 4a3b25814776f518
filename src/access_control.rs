// Access-control levels, lowest to highest

/// Anyone, no credentials needed
pub const PRIVILEGE_LEVEL_PUBLIC: i64 = 0;

/// Any authenticated user
pub const PRIVILEGE_LEVEL_USER: i64 = 1;

pub const PRIVILEGE_LEVEL_ADMIN: i64 = 2;
