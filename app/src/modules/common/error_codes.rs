/// a request to a endpoint was not authorized because it did
/// not contain the session id cookie in the request headers
pub static NO_SID_COOKIE: &str = "NO_SID_COOKIE";

/// a request to a endpoint was not authorized because the
/// session on the session id cookie is expired or does not exist
pub static INVALID_SESSION: &str = "INVALID_SESSION";

/// the identifier / PIN pair did not match an active account,
/// an unknown identifier and a wrong PIN produce the same code
/// on purpose so accounts cannot be enumerated
pub static INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";

/// the request user role is not allowed to call the endpoint
pub static ROLE_NOT_ALLOWED: &str = "ROLE_NOT_ALLOWED";

/// a staff member could not be registered because the last 4
/// license digits are already taken by another account
pub static LICENSE_IN_USE: &str = "LICENSE_IN_USE";

/// generating a unique employee id failed even after a retry
pub static EMPLOYEE_ID_GENERATION: &str = "EMPLOYEE_ID_GENERATION";

/// a vehicle could not be created because the unit number is taken
pub static UNIT_NUMBER_IN_USE: &str = "UNIT_NUMBER_IN_USE";

/// a vehicle could not be created because the plate number is taken
pub static PLATE_IN_USE: &str = "PLATE_IN_USE";

/// a key could not be registered because the printed number is taken
pub static KEY_NUMBER_IN_USE: &str = "KEY_NUMBER_IN_USE";

/// a key could not be registered because the vehicle already has one
pub static VEHICLE_ALREADY_HAS_KEY: &str = "VEHICLE_ALREADY_HAS_KEY";

/// a key cannot be checked out or searched for pickup because its
/// not on the AVAILABLE status
pub static KEY_NOT_AVAILABLE: &str = "KEY_NOT_AVAILABLE";

/// a key cannot be checked out because a open transaction references it
pub static KEY_IN_USE: &str = "KEY_IN_USE";

/// the request user reached the per user open loan cap
pub static LOAN_LIMIT_REACHED: &str = "LOAN_LIMIT_REACHED";

/// a loan can only be closed by the staff member that opened it
pub static NOT_LOAN_OWNER: &str = "NOT_LOAN_OWNER";

/// the loan was already closed, keys cannot be returned twice
pub static ALREADY_CHECKED_IN: &str = "ALREADY_CHECKED_IN";

/// the key was returned before the minimum loan duration elapsed
pub static RETURNED_TOO_SOON: &str = "RETURNED_TOO_SOON";

/// returning a vehicle in a damaged condition requires a incident report
pub static INCIDENT_REPORT_REQUIRED: &str = "INCIDENT_REPORT_REQUIRED";

/// the incident report must be between 10 and 1000 characters long
pub static INCIDENT_REPORT_LENGTH: &str = "INCIDENT_REPORT_LENGTH";
