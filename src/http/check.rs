/// Statuses k6 treats as an expected response; anything else counts
/// towards `http_req_failed`.
const EXPECTED_RESPONSE_STATUSES: std::ops::RangeInclusive<u16> = 200..=399;

/// Name of the per-response check, e.g. `status is 200`.
#[must_use]
pub fn check_name(expected_status: u16) -> String {
    format!("status is {}", expected_status)
}

/// `status is N` check. A missing response (status 0) never passes.
#[must_use]
pub const fn check_status(status: u16, expected_status: u16) -> bool {
    status != 0 && status == expected_status
}

#[must_use]
pub fn is_failed_request(status: u16, transport_error: bool) -> bool {
    transport_error || !EXPECTED_RESPONSE_STATUSES.contains(&status)
}
